use pixel_canvas_synth::nodes::sine_table::lookup;
use pixel_canvas_synth::score::{paint_stroke, Stroke};
use pixel_canvas_synth::{
    CanvasConfig, Oscillator, OscillatorBank, PixelImage, PlaybackCursor, Synth,
};

const SAMPLE_RATE: f32 = 48_000.0;
const BLOCK: usize = 64;
const EPSILON: f32 = 1e-6;

fn config(oscillators: usize) -> CanvasConfig {
    CanvasConfig {
        sample_rate: SAMPLE_RATE,
        block_size: BLOCK,
        oscillator_count: oscillators,
        ..CanvasConfig::default()
    }
}

fn render_block(synth: &mut Synth) -> (Vec<f32>, Vec<f32>) {
    let mut left = vec![0.0; BLOCK];
    let mut right = vec![0.0; BLOCK];
    {
        let mut outputs = [left.as_mut_slice(), right.as_mut_slice()];
        synth.process_realtime(&mut outputs, BLOCK);
    }
    (left, right)
}

fn energy(buffer: &[f32]) -> f32 {
    buffer.iter().map(|x| x * x).sum()
}

#[test]
fn only_the_lit_oscillator_is_heard() {
    let (mut synth, mut producer) = Synth::with_ring_buffer(&config(4)).unwrap();
    producer
        .write(&[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
        .unwrap();
    let (left, right) = render_block(&mut synth);

    let mut lone = Oscillator::new(SAMPLE_RATE, 55.0, 0.0);
    lone.set_target_amplitudes(1.0, 1.0);
    let mut lone_left = vec![0.0; BLOCK];
    let mut lone_right = vec![0.0; BLOCK];
    lone.process_add(&mut lone_left, &mut lone_right);

    let residual: Vec<f32> = left.iter().zip(&lone_left).map(|(a, b)| a - b).collect();
    assert!(energy(&left) > 0.1);
    assert!(energy(&residual) < 1e-10);
    assert_eq!(left, right);
    assert_eq!(lone_left, lone_right);
}

#[test]
fn amplitude_ramps_across_first_block_then_holds() {
    let (mut synth, mut producer) = Synth::with_ring_buffer(&config(4)).unwrap();
    producer
        .write(&[0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])
        .unwrap();
    let (first, _) = render_block(&mut synth);
    let (second, _) = render_block(&mut synth);

    let increment = 55.0 / SAMPLE_RATE;
    let mut phase = 0.0f32;
    for i in 0..BLOCK {
        phase += increment;
        phase -= phase.floor();
        let expected = lookup(phase) * (i as f32 / BLOCK as f32);
        assert!((first[i] - expected).abs() < EPSILON, "sample {}", i);
    }
    for (i, &sample) in second.iter().enumerate() {
        phase += increment;
        phase -= phase.floor();
        assert!((sample - lookup(phase)).abs() < EPSILON, "sample {}", i);
    }
}

#[test]
fn painted_row_travels_from_cursor_to_output() {
    let oscillators = 8;
    let mut image = PixelImage::new(4, oscillators).unwrap();
    paint_stroke(
        &mut image,
        &Stroke {
            semitone: 3,
            start_column: 0,
            length: 1,
            pan: 1.0,
            level: 1.0,
        },
    );

    let cfg = CanvasConfig {
        overall_gain: 0.5,
        ..config(oscillators)
    };
    let (mut synth, mut producer) = Synth::with_ring_buffer(&cfg).unwrap();
    let mut cursor = PlaybackCursor::from_config(&cfg);
    cursor.start();
    cursor.send(&image, &mut producer).unwrap();

    let (left, right) = render_block(&mut synth);
    // Fully red pixel: right channel only, on oscillator 6.
    assert!(energy(&left) == 0.0);
    assert!(energy(&right) > 0.0);
    assert_eq!(synth.bank().target_amplitude(6), (0.0, 0.5));
    for index in (0..oscillators).filter(|&i| i != 6) {
        assert_eq!(synth.bank().target_amplitude(index), (0.0, 0.0));
    }

    cursor.stop();
    cursor.send(&image, &mut producer).unwrap();
    render_block(&mut synth);
    let (_, right) = render_block(&mut synth);
    assert!(right.iter().all(|&s| s == 0.0));
}

#[test]
fn stale_targets_survive_producer_stall() {
    let (mut synth, mut producer) = Synth::with_ring_buffer(&config(4)).unwrap();
    producer
        .write(&[2.0, 0.5, 0.0, 0.0, 0.3, 0.3, 0.0, 0.0, 0.0, 0.0])
        .unwrap();
    render_block(&mut synth);
    for _ in 0..10 {
        let (left, _) = render_block(&mut synth);
        assert!(energy(&left) > 0.0);
    }
    assert_eq!(synth.bank().target_amplitude(1), (0.3, 0.3));
    assert_eq!(synth.pd_distort(), 0.5);
}
