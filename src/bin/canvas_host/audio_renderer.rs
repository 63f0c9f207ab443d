//! Block renderer contract between the cpal host and the synth.

use pixel_canvas_synth::{OscillatorBank, Synth};

/// Anything that fills one fixed-size stereo block per call.
pub trait AudioRenderer: Send + 'static {
    fn process_block(&mut self, output_left: &mut [f32], output_right: &mut [f32]);
}

impl<B: OscillatorBank> AudioRenderer for Synth<B> {
    fn process_block(&mut self, output_left: &mut [f32], output_right: &mut [f32]) {
        let frames = output_left.len();
        let mut outputs = [output_left, output_right];
        self.process_realtime(&mut outputs, frames);
    }
}
