use pixel_canvas_synth::image::pixel_amplitudes;
use pixel_canvas_synth::render::{column_at, frame_count, render_image, RenderSettings};
use pixel_canvas_synth::score::demo_score;
use pixel_canvas_synth::{CanvasConfig, ControlFrame, PdMode, PhaseInit, PixelImage, Synth};

/// Replay the offline renderer's per-block targets through the ring buffer
/// and the realtime entry point.
fn render_online(image: &PixelImage, config: &CanvasConfig) -> (Vec<f32>, Vec<f32>) {
    let frames = frame_count(image.width(), config.speed_px_per_sec, config.sample_rate).unwrap();
    let block = config.render_block_size;
    let online_config = CanvasConfig {
        oscillator_count: image.height(),
        ..config.clone()
    };
    let (mut synth, mut producer) = Synth::with_ring_buffer(&online_config).unwrap();

    let mut frame = ControlFrame::with_oscillators(image.height());
    frame.set_pd_mode(config.pd_mode);
    frame.set_pd_distort(config.pd_distort);

    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    let mut block_left = vec![0.0; block];
    let mut block_right = vec![0.0; block];

    let mut offset = 0;
    while offset < frames {
        let column = column_at(offset, frames, image.width());
        for oscillator in 0..image.height() {
            let (l, r) = pixel_amplitudes(
                image.oscillator_pixel(oscillator, column),
                config.overall_gain,
            );
            frame.set_amplitude(oscillator, l, r);
        }
        producer.write(frame.as_slice()).unwrap();
        {
            let mut outputs = [block_left.as_mut_slice(), block_right.as_mut_slice()];
            synth.process_realtime(&mut outputs, block);
        }
        let take = block.min(frames - offset);
        left.extend_from_slice(&block_left[..take]);
        right.extend_from_slice(&block_right[..take]);
        offset += block;
    }
    (left, right)
}

fn assert_equivalent(config: CanvasConfig, image: PixelImage) {
    let offline = render_image(&image, &RenderSettings::from_config(&config)).unwrap();
    let (left, right) = render_online(&image, &config);
    assert_eq!(offline.frames(), left.len());
    assert!(offline.left.iter().any(|&s| s != 0.0));
    assert_eq!(offline.left, left);
    assert_eq!(offline.right, right);
}

#[test]
fn demo_score_renders_identically_both_ways() {
    let config = CanvasConfig {
        image_width: 32,
        oscillator_count: 60,
        speed_px_per_sec: 256.0,
        overall_gain: 0.2,
        ..CanvasConfig::default()
    };
    let image = demo_score(config.image_width, config.oscillator_count).unwrap();
    assert_equivalent(config, image);
}

#[test]
fn distorted_random_phase_render_matches() {
    let config = CanvasConfig {
        image_width: 16,
        oscillator_count: 21,
        speed_px_per_sec: 512.0,
        overall_gain: 0.3,
        pd_mode: PdMode::Saw,
        pd_distort: 0.35,
        phase_init: PhaseInit::Random { seed: 9 },
        render_block_size: 48,
        ..CanvasConfig::default()
    };
    let mut image = PixelImage::new(config.image_width, config.oscillator_count).unwrap();
    for column in 0..config.image_width {
        let row = (column * 5) % config.oscillator_count;
        image.set_pixel(row, column, 0xff40_80c0);
        image.set_pixel(config.oscillator_count - 1 - row, column, 0xffff_00ff);
    }
    assert_equivalent(config, image);
}
