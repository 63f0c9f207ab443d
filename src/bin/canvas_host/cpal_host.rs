//! cpal output host: device selection, stream setup and sample conversion.

use crate::audio_buffer::AudioBuffer;
use crate::audio_renderer::AudioRenderer;
use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Sample, SampleFormat, SizedSample, StreamConfig, SupportedBufferSize};
use dasp_sample::FromSample;

// Host callback sizes; the engine block is fixed separately.
const JACK_HOST_BUFFER: usize = 512;
const ALSA_HOST_BUFFER: usize = 1024;
const DEFAULT_HOST_BUFFER: usize = 512;

#[derive(Debug, Clone)]
pub struct AudioHostConfig {
    pub sample_rate: f32,
    pub channels: u16,
    pub engine_block_size: usize,
    pub device_name: String,
    pub host_name: String,
}

pub struct AudioHost {
    _stream: cpal::Stream,
    config: AudioHostConfig,
}

struct SelectedOutput {
    device: cpal::Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    host_name: String,
    buffer_range: Option<(u32, u32)>,
}

impl AudioHost {
    /// Open the first usable output device and start playing.
    ///
    /// `factory` receives the negotiated sample rate; the renderer it returns
    /// is always driven with `engine_block_size` frames.
    pub fn new<R, F>(
        preferred_sample_rate: u32,
        engine_block_size: usize,
        factory: F,
    ) -> anyhow::Result<Self>
    where
        R: AudioRenderer,
        F: FnOnce(f32) -> anyhow::Result<R>,
    {
        let SelectedOutput {
            device,
            config,
            sample_format,
            host_name,
            buffer_range,
        } = select_output_device(preferred_sample_rate)?;

        log::info!("=== AUDIO CONFIGURATION ===");
        if let Some((min, max)) = buffer_range {
            log::info!("Device buffer size range: {}..={} frames", min, max);
        }
        let host_frames = match config.buffer_size {
            BufferSize::Fixed(actual) => actual.to_string(),
            BufferSize::Default => "default".to_string(),
        };

        let sample_rate = config.sample_rate.0 as f32;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        log::info!("Sample rate: {} Hz", sample_rate);
        log::info!("Channels: {}", config.channels);

        let renderer = factory(sample_rate)?;
        let buffer = AudioBuffer::new(renderer, engine_block_size);

        let host_config = AudioHostConfig {
            sample_rate,
            channels: config.channels,
            engine_block_size: buffer.engine_block_size,
            device_name: device_name.clone(),
            host_name: host_name.clone(),
        };

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32, R>(device, config, buffer)?,
            SampleFormat::I16 => build_stream::<i16, R>(device, config, buffer)?,
            SampleFormat::U16 => build_stream::<u16, R>(device, config, buffer)?,
            other => anyhow::bail!("unsupported sample format: {:?}", other),
        };

        stream.play().context("failed to start stream")?;

        log::info!("=== NOW PLAYING ===");
        log::info!(
            "Host: '{}', Device: '{}', Sample Rate: {} Hz",
            host_name,
            device_name,
            sample_rate
        );
        log::info!(
            "Host Block: {}, Engine Block: {}",
            host_frames,
            host_config.engine_block_size
        );

        Ok(Self {
            _stream: stream,
            config: host_config,
        })
    }

    pub fn config(&self) -> &AudioHostConfig {
        &self.config
    }
}

fn select_output_device(preferred_sample_rate: u32) -> anyhow::Result<SelectedOutput> {
    let mut last_error: Option<anyhow::Error> = None;

    for host_id in cpal::available_hosts() {
        let host = cpal::host_from_id(host_id)?;
        let host_name = host_id.name().to_string();

        let Some(device) = host.default_output_device() else {
            last_error = Some(anyhow::anyhow!(
                "host {} has no default output device",
                host_name
            ));
            continue;
        };

        match device.supported_output_configs() {
            Ok(configs) => {
                for supported in configs {
                    let sample_format = supported.sample_format();
                    if !matches!(
                        sample_format,
                        SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
                    ) || supported.channels() < 2
                    {
                        continue;
                    }

                    if supported.min_sample_rate().0 <= preferred_sample_rate
                        && supported.max_sample_rate().0 >= preferred_sample_rate
                    {
                        let supported =
                            supported.with_sample_rate(cpal::SampleRate(preferred_sample_rate));
                        let (buffer_size, buffer_range) =
                            choose_buffer_size(supported.buffer_size().clone(), &host_name);
                        let mut config = supported.config();
                        config.buffer_size = buffer_size;
                        log::info!(
                            "Using preferred sample rate: {} Hz (format: {:?})",
                            preferred_sample_rate,
                            sample_format
                        );
                        return Ok(SelectedOutput {
                            device,
                            config,
                            sample_format,
                            host_name,
                            buffer_range,
                        });
                    }
                }
            }
            Err(err) => {
                last_error = Some(anyhow::anyhow!(
                    "failed to enumerate output configs for host {}: {}",
                    host_name,
                    err
                ));
            }
        }

        match device.default_output_config() {
            Ok(supported) if supported.channels() >= 2 => {
                let sample_format = supported.sample_format();
                let (buffer_size, buffer_range) =
                    choose_buffer_size(supported.buffer_size().clone(), &host_name);
                let mut config = supported.config();
                config.buffer_size = buffer_size;
                log::warn!(
                    "Using device default sample rate: {} Hz (preferred {} Hz not available)",
                    config.sample_rate.0,
                    preferred_sample_rate
                );
                return Ok(SelectedOutput {
                    device,
                    config,
                    sample_format,
                    host_name,
                    buffer_range,
                });
            }
            Ok(_) => {
                last_error = Some(anyhow::anyhow!(
                    "default output of host {} is not stereo",
                    host_name
                ));
            }
            Err(err) => {
                last_error = Some(anyhow::anyhow!(
                    "failed to query default output config for host {}: {}",
                    host_name,
                    err
                ));
            }
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("no usable output device found")))
}

fn choose_buffer_size(
    supported: SupportedBufferSize,
    host_name: &str,
) -> (BufferSize, Option<(u32, u32)>) {
    let preferred_host_buffer = match host_name {
        "JACK" => JACK_HOST_BUFFER,
        "ALSA" => ALSA_HOST_BUFFER,
        _ => DEFAULT_HOST_BUFFER,
    };

    match supported {
        // JACK picks its own period; the carry buffer absorbs it.
        SupportedBufferSize::Range { min, max } if host_name == "JACK" => {
            (BufferSize::Default, Some((min, max)))
        }
        SupportedBufferSize::Range { min, max } => (
            BufferSize::Fixed((preferred_host_buffer as u32).clamp(min, max)),
            Some((min, max)),
        ),
        SupportedBufferSize::Unknown => (BufferSize::Fixed(preferred_host_buffer as u32), None),
    }
}

fn build_stream<T, R>(
    device: cpal::Device,
    config: StreamConfig,
    mut buffer: AudioBuffer<R>,
) -> anyhow::Result<cpal::Stream>
where
    T: Sample + SizedSample + FromSample<f32>,
    R: AudioRenderer,
{
    let channels = config.channels as usize;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [T], _| {
                write_interleaved(data, channels, &mut buffer);
            },
            move |err| {
                log::error!("Stream error: {}", err);
            },
            None,
        )
        .context("failed to build stream")?;

    Ok(stream)
}

/// Copy engine blocks into the device's interleaved buffer. Channels past
/// the first two are silent.
fn write_interleaved<T, R>(output: &mut [T], channels: usize, buffer: &mut AudioBuffer<R>)
where
    T: Sample + FromSample<f32>,
    R: AudioRenderer,
{
    if channels == 0 {
        return;
    }
    let total_frames = output.len() / channels;
    buffer.pull(total_frames, |frame, left, right| {
        let base = frame * channels;
        for ch in 0..channels {
            let value = match ch {
                0 => left,
                1 => right,
                _ => 0.0,
            };
            output[base + ch] = T::from_sample::<f32>(value);
        }
    });
}
