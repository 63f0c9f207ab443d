// src/traits/mod.rs
use crate::nodes::PdMode;

/// A fixed set of oscillators that renders one block at a time.
///
/// Implementations are chosen at compile time through the synth's type
/// parameter, so the hot loop never goes through dynamic dispatch.
pub trait OscillatorBank: Send + 'static {
    /// Build a bank whose slot `i` runs at `frequencies[i]` starting from `phases[i]`.
    fn build(sample_rate: f32, frequencies: &[f32], phases: &[f32]) -> Self
    where
        Self: Sized;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn frequency(&self, index: usize) -> f32;

    fn set_pd_mode(&mut self, pd_mode: PdMode);
    fn set_pd_distort(&mut self, pd_distort: f32);

    /// Set the amplitudes the oscillator ramps towards over the next block.
    fn set_target_amplitude(&mut self, index: usize, left: f32, right: f32);
    fn target_amplitude(&self, index: usize) -> (f32, f32);
    fn amplitude(&self, index: usize) -> (f32, f32);

    /// Add one block of every oscillator into the stereo accumulators.
    fn process_add(&mut self, out_left: &mut [f32], out_right: &mut [f32]);
}
