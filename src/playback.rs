use crate::audio::RingProducer;
use crate::automation::ControlFrame;
use crate::config::CanvasConfig;
use crate::error::Result;
use crate::image::{pixel_amplitudes, PixelImage};
use crate::nodes::PdMode;

/// Control-rate producer: walks a column cursor across the canvas and turns
/// the pixels under it into control frames.
#[derive(Clone, Debug)]
pub struct PlaybackCursor {
    position: f32,
    speed_px_per_sec: f32,
    overall_gain: f32,
    playing: bool,
    frame: ControlFrame,
}

impl PlaybackCursor {
    pub fn new(oscillator_count: usize, speed_px_per_sec: f32, overall_gain: f32) -> Self {
        Self {
            position: 0.0,
            speed_px_per_sec,
            overall_gain,
            playing: false,
            frame: ControlFrame::with_oscillators(oscillator_count),
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        let mut cursor = Self::new(
            config.oscillator_count,
            config.speed_px_per_sec,
            config.overall_gain,
        );
        cursor.set_pd_mode(config.pd_mode);
        cursor.set_pd_distort(config.pd_distort);
        cursor
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn speed(&self) -> f32 {
        self.speed_px_per_sec
    }

    pub fn set_speed(&mut self, speed_px_per_sec: f32) {
        self.speed_px_per_sec = speed_px_per_sec.max(0.0);
    }

    pub fn overall_gain(&self) -> f32 {
        self.overall_gain
    }

    pub fn set_overall_gain(&mut self, overall_gain: f32) {
        self.overall_gain = overall_gain.max(0.0);
    }

    pub fn set_pd_mode(&mut self, pd_mode: PdMode) {
        self.frame.set_pd_mode(pd_mode);
    }

    pub fn set_pd_distort(&mut self, pd_distort: f32) {
        self.frame.set_pd_distort(pd_distort.clamp(0.0, 1.0));
    }

    pub fn start(&mut self) {
        self.playing = true;
    }

    /// Stop and rewind to the first column.
    pub fn stop(&mut self) {
        self.playing = false;
        self.position = 0.0;
    }

    /// Move the cursor by `speed * dt`, wrapping modulo `width`. No-op while stopped.
    pub fn advance(&mut self, dt_seconds: f32, width: usize) {
        if !self.playing || width == 0 {
            return;
        }
        let width = width as f32;
        self.position += self.speed_px_per_sec * dt_seconds;
        if self.position >= width || self.position < 0.0 {
            self.position = self.position.rem_euclid(width);
        }
    }

    /// Integer column under the cursor, always inside the image.
    pub fn column(&self, width: usize) -> usize {
        (self.position as usize).min(width.saturating_sub(1))
    }

    /// Refresh the control frame from `image`. While stopped every amplitude is zero.
    pub fn build_frame(&mut self, image: &PixelImage) -> &ControlFrame {
        if !self.playing {
            self.frame.silence();
            return &self.frame;
        }

        let column = self.column(image.width());
        let rows = self.frame.oscillator_count().min(image.height());
        for oscillator in 0..rows {
            let (left, right) =
                pixel_amplitudes(image.oscillator_pixel(oscillator, column), self.overall_gain);
            self.frame.set_amplitude(oscillator, left, right);
        }
        for oscillator in rows..self.frame.oscillator_count() {
            self.frame.set_amplitude(oscillator, 0.0, 0.0);
        }
        &self.frame
    }

    /// Build the current frame and push it to the audio thread in one write.
    pub fn send(&mut self, image: &PixelImage, producer: &mut RingProducer<f32>) -> Result<()> {
        self.build_frame(image);
        producer.write(self.frame.as_slice())?;
        Ok(())
    }
}
