//! Offline rendering of a canvas to stereo audio, and WAV export.
//!
//! The renderer drives the same [`Synth`] the audio callback uses, but sets
//! targets directly with [`Synth::set_oscillator_amplitude`] instead of going
//! through the ring buffer.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio_engine::Synth;
use crate::config::{CanvasConfig, PhaseInit};
use crate::error::{CanvasError, Result};
use crate::image::{pixel_amplitudes, PixelImage};
use crate::nodes::PdMode;
use crate::traits::OscillatorBank;
use crate::utils::{interleave_stereo, peak};

pub const MIN_RENDER_SPEED: f32 = 0.01;
pub const WAV_EXTENSION: &str = "wav";
/// Largest stereo 32-bit float render whose data chunk fits a WAV file.
pub const MAX_RENDER_FRAMES: usize = u32::MAX as usize / (2 * 4);

#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub sample_rate: f32,
    pub block_size: usize,
    pub speed_px_per_sec: f32,
    pub overall_gain: f32,
    pub pd_mode: PdMode,
    pub pd_distort: f32,
    pub phase_init: PhaseInit,
}

impl RenderSettings {
    pub fn from_config(config: &CanvasConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            block_size: config.render_block_size,
            speed_px_per_sec: config.speed_px_per_sec,
            overall_gain: config.overall_gain,
            pd_mode: config.pd_mode,
            pd_distort: config.pd_distort,
            phase_init: config.phase_init,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedAudio {
    pub sample_rate: f32,
    pub left: Vec<f32>,
    pub right: Vec<f32>,
}

impl RenderedAudio {
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn duration_secs(&self) -> f32 {
        self.frames() as f32 / self.sample_rate
    }

    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::new();
        interleave_stereo(&self.left, &self.right, &mut out);
        out
    }
}

/// Frames needed to sweep `width` columns at `speed` px/s.
pub fn frame_count(width: usize, speed_px_per_sec: f32, sample_rate: f32) -> Result<usize> {
    if !(speed_px_per_sec >= MIN_RENDER_SPEED) {
        return Err(CanvasError::SpeedTooSlow);
    }
    let frames = (width as f32 / speed_px_per_sec * sample_rate) as usize;
    if frames > MAX_RENDER_FRAMES {
        return Err(CanvasError::RenderTooLong {
            frames,
            max: MAX_RENDER_FRAMES,
        });
    }
    Ok(frames)
}

/// Image column sounding at frame `offset` of a `frames`-long render.
#[inline]
pub fn column_at(offset: usize, frames: usize, width: usize) -> usize {
    if frames == 0 {
        return 0;
    }
    let column = (offset as f32 * width as f32 / frames as f32) as usize;
    column.min(width - 1)
}

/// Render every column of `image` with the default bank.
pub fn render_image(image: &PixelImage, settings: &RenderSettings) -> Result<RenderedAudio> {
    render_image_with::<crate::audio_engine::DefaultBank>(image, settings)
}

/// One oscillator per image row; targets are refreshed once per block from
/// the column under the block's first frame.
pub fn render_image_with<B: OscillatorBank>(
    image: &PixelImage,
    settings: &RenderSettings,
) -> Result<RenderedAudio> {
    let frames = frame_count(image.width(), settings.speed_px_per_sec, settings.sample_rate)?;
    let block_size = settings.block_size.max(1);
    let oscillators = image.height();

    log::info!(
        "rendering {}x{} canvas: {} frames at {} Hz ({:.2} s)",
        image.width(),
        image.height(),
        frames,
        settings.sample_rate,
        frames as f32 / settings.sample_rate
    );

    let mut synth = Synth::<B>::build(settings.sample_rate, oscillators, settings.phase_init);
    synth.set_pd_mode(settings.pd_mode);
    synth.set_pd_distort(settings.pd_distort);

    let mut left = Vec::new();
    let mut right = Vec::new();
    left.try_reserve_exact(frames)
        .and_then(|_| right.try_reserve_exact(frames))
        .map_err(|_| CanvasError::RenderAlloc { frames })?;
    let mut block_left = vec![0.0; block_size];
    let mut block_right = vec![0.0; block_size];

    let mut offset = 0;
    while offset < frames {
        let column = column_at(offset, frames, image.width());
        for oscillator in 0..oscillators {
            let (l, r) = pixel_amplitudes(
                image.oscillator_pixel(oscillator, column),
                settings.overall_gain,
            );
            synth.set_oscillator_amplitude(oscillator, l, r);
        }
        synth.process_stereo(&mut block_left, &mut block_right);

        let take = block_size.min(frames - offset);
        left.extend_from_slice(&block_left[..take]);
        right.extend_from_slice(&block_right[..take]);
        offset += block_size;
    }

    log::debug!(
        "render done: peak L {:.4}, peak R {:.4}",
        peak(&left),
        peak(&right)
    );

    Ok(RenderedAudio {
        sample_rate: settings.sample_rate,
        left,
        right,
    })
}

fn check_wav_path(path: &Path) -> Result<()> {
    let suffix = format!(".{}", WAV_EXTENSION);
    if path.to_string_lossy().ends_with(&suffix) {
        Ok(())
    } else {
        Err(CanvasError::BadExtension {
            expected: WAV_EXTENSION,
        })
    }
}

/// Write stereo 32-bit float WAV.
pub fn write_wav(path: impl AsRef<Path>, audio: &RenderedAudio) -> Result<()> {
    let path = path.as_ref();
    check_wav_path(path)?;

    let spec = WavSpec {
        channels: 2,
        sample_rate: audio.sample_rate as u32,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for sample in audio.interleaved() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    log::info!("wrote {} frames to {}", audio.frames(), path.display());
    Ok(())
}

/// Validate, render and write in one go; nothing is rendered if the path or
/// speed is rejected.
pub fn render_to_wav(
    path: impl AsRef<Path>,
    image: &PixelImage,
    settings: &RenderSettings,
) -> Result<RenderedAudio> {
    let path = path.as_ref();
    check_wav_path(path)?;
    let audio = render_image(image, settings)?;
    write_wav(path, &audio)?;
    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(speed: f32) -> RenderSettings {
        RenderSettings {
            speed_px_per_sec: speed,
            overall_gain: 1.0,
            ..RenderSettings::default()
        }
    }

    #[test]
    fn frame_count_follows_width_and_speed() {
        assert_eq!(frame_count(640, 100.0, 48_000.0).unwrap(), 307_200);
        assert_eq!(frame_count(4, 256.0, 48_000.0).unwrap(), 750);
    }

    #[test]
    fn too_slow_is_rejected_with_message() {
        let err = frame_count(10, 0.001, 48_000.0).unwrap_err();
        assert_eq!(err.to_string(), "Speed is too slow to render audio.");
        assert!(frame_count(10, f32::NAN, 48_000.0).is_err());
    }

    #[test]
    fn renders_longer_than_a_wav_file_are_rejected() {
        // 640 px at the slowest speed is over three billion frames.
        assert!(matches!(
            frame_count(640, MIN_RENDER_SPEED, 48_000.0),
            Err(CanvasError::RenderTooLong { max: MAX_RENDER_FRAMES, .. })
        ));

        let image = PixelImage::filled(640, 2, 0xffff_00ff).unwrap();
        let err = render_image(&image, &settings(MIN_RENDER_SPEED)).unwrap_err();
        assert!(matches!(err, CanvasError::RenderTooLong { .. }));
    }

    #[test]
    fn columns_sweep_left_to_right() {
        assert_eq!(column_at(0, 400, 4), 0);
        assert_eq!(column_at(100, 400, 4), 1);
        assert_eq!(column_at(399, 400, 4), 3);
        assert_eq!(column_at(400, 400, 4), 3);
    }

    #[test]
    fn black_canvas_renders_silence() {
        let image = PixelImage::new(4, 3).unwrap();
        let audio = render_image(&image, &settings(256.0)).unwrap();
        assert_eq!(audio.frames(), 750);
        assert!(audio.left.iter().chain(&audio.right).all(|&s| s == 0.0));
    }

    #[test]
    fn tail_block_is_truncated() {
        let image = PixelImage::filled(3, 2, 0xffff_ffff).unwrap();
        // 3 / 768 * 48000 = 187.5, so 187 frames: not a multiple of 64.
        let audio = render_image(&image, &settings(768.0)).unwrap();
        assert_eq!(audio.frames(), 187);
        assert_eq!(audio.right.len(), 187);
        assert!(peak(&audio.left) > 0.5);
    }

    #[test]
    fn wrong_extension_is_rejected() {
        let audio = RenderedAudio::default();
        let err = write_wav("out.mp3", &audio).unwrap_err();
        assert_eq!(err.to_string(), "File name must end in .wav");
        let image = PixelImage::new(2, 2).unwrap();
        assert!(matches!(
            render_to_wav("out.WAVE", &image, &settings(100.0)),
            Err(CanvasError::BadExtension { .. })
        ));
    }
}
