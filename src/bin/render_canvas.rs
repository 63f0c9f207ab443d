//! Offline render of the demo canvas to a stereo float WAV file.
//!
//! Usage: `render_canvas [config.json] [output.wav]`

use anyhow::Context;
use pixel_canvas_synth::render::{render_to_wav, RenderSettings};
use pixel_canvas_synth::score::demo_score;
use pixel_canvas_synth::CanvasConfig;

const DEFAULT_OUTPUT: &str = "canvas.wav";

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .context("failed to install logger")?;

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) if path != "-" => CanvasConfig::load(&path)
            .with_context(|| format!("failed to load config from {}", path))?,
        _ => CanvasConfig::default(),
    };
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_string());

    let image = demo_score(config.image_width, config.oscillator_count)?;
    let settings = RenderSettings::from_config(&config);
    let audio = render_to_wav(&output, &image, &settings)?;

    log::info!(
        "rendered {:.2} s of audio to {}",
        audio.duration_secs(),
        output
    );
    Ok(())
}
