//! Realtime playback of the demo canvas through the default output device.
//!
//! Usage: `canvas_host [config.json]`

mod audio_buffer;
mod audio_renderer;
mod cpal_host;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use pixel_canvas_synth::score::demo_score;
use pixel_canvas_synth::{CanvasConfig, PlaybackCursor, RingBuffer, Synth};

use cpal_host::AudioHost;

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .context("failed to install logger")?;

    let mut config = match std::env::args().nth(1) {
        Some(path) => CanvasConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        None => CanvasConfig::default(),
    };

    let (mut producer, consumer) = RingBuffer::<f32>::new(config.ring_capacity())
        .context("failed to allocate control ring buffer")?;

    let host = AudioHost::new(
        config.sample_rate as u32,
        config.block_size,
        |sample_rate| {
            let mut synth: Synth = Synth::from_config(&CanvasConfig {
                sample_rate,
                ..config.clone()
            });
            synth.attach_ring(consumer)?;
            Ok(synth)
        },
    )?;
    config.sample_rate = host.config().sample_rate;

    let image = demo_score(config.image_width, config.oscillator_count)?;
    let mut cursor = PlaybackCursor::from_config(&config);
    cursor.start();

    log::info!(
        "playing {}x{} canvas at {} px/s, press Ctrl+C to stop",
        image.width(),
        image.height(),
        config.speed_px_per_sec
    );

    let frame_interval = Duration::from_millis(config.frame_interval_ms.max(1));
    let control = thread::Builder::new()
        .name("canvas-control".to_string())
        .spawn(move || -> pixel_canvas_synth::Result<()> {
            let mut last = Instant::now();
            let mut sweeps = 0usize;
            loop {
                cursor.send(&image, &mut producer)?;
                thread::sleep(frame_interval);

                let now = Instant::now();
                let before = cursor.position();
                cursor.advance(now.duration_since(last).as_secs_f32(), image.width());
                last = now;
                if cursor.position() < before {
                    sweeps += 1;
                    log::info!("sweep {} complete", sweeps);
                }
            }
        })
        .context("failed to spawn control thread")?;

    match control.join() {
        Ok(result) => result.context("control thread stopped"),
        Err(_) => anyhow::bail!("control thread panicked"),
    }
}
