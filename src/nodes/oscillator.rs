use super::phase_distortion::{PdMode, PdShape};
use super::sine_table;

/// A fixed-pitch sine voice with phase distortion and block-ramped stereo gain.
#[derive(Debug, Clone)]
pub struct Oscillator {
    sample_rate: f32,
    frequency: f32,
    phase_increment: f32,
    phase: f32,
    amplitude_left: f32,
    amplitude_right: f32,
    target_amplitude_left: f32,
    target_amplitude_right: f32,
    pd_mode: PdMode,
    pd_distort: f32,
}

impl Oscillator {
    pub fn new(sample_rate: f32, frequency: f32, phase: f32) -> Self {
        sine_table::prepare();
        Self {
            sample_rate,
            frequency,
            phase_increment: frequency / sample_rate,
            phase: wrap_phase(phase),
            amplitude_left: 0.0,
            amplitude_right: 0.0,
            target_amplitude_left: 0.0,
            target_amplitude_right: 0.0,
            pd_mode: PdMode::Pulsar,
            pd_distort: 0.0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn amplitude(&self) -> (f32, f32) {
        (self.amplitude_left, self.amplitude_right)
    }

    pub fn target_amplitude(&self) -> (f32, f32) {
        (self.target_amplitude_left, self.target_amplitude_right)
    }

    pub fn set_target_amplitude_left(&mut self, amplitude: f32) {
        self.target_amplitude_left = amplitude;
    }

    pub fn set_target_amplitude_right(&mut self, amplitude: f32) {
        self.target_amplitude_right = amplitude;
    }

    pub fn set_target_amplitudes(&mut self, left: f32, right: f32) {
        self.target_amplitude_left = left;
        self.target_amplitude_right = right;
    }

    pub fn pd_mode(&self) -> PdMode {
        self.pd_mode
    }

    pub fn pd_distort(&self) -> f32 {
        self.pd_distort
    }

    pub fn set_pd_mode(&mut self, pd_mode: PdMode) {
        self.pd_mode = pd_mode;
    }

    pub fn set_pd_distort(&mut self, pd_distort: f32) {
        self.pd_distort = pd_distort;
    }

    /// Render one block and add it into the output accumulators.
    ///
    /// The applied gain ramps linearly from the current amplitude towards the
    /// target, reaching it at the end of the block; afterwards the target
    /// becomes the current amplitude.
    pub fn process_add(&mut self, out_left: &mut [f32], out_right: &mut [f32]) {
        let block_size = out_left.len().min(out_right.len());
        if block_size == 0 {
            return;
        }

        let shape = PdShape::new(self.pd_mode, self.pd_distort);
        let delta_left = self.target_amplitude_left - self.amplitude_left;
        let delta_right = self.target_amplitude_right - self.amplitude_right;
        let block = block_size as f32;

        for (i, (left, right)) in out_left
            .iter_mut()
            .zip(out_right.iter_mut())
            .take(block_size)
            .enumerate()
        {
            self.phase = wrap_phase(self.phase + self.phase_increment);
            let sample = sine_table::lookup(shape.apply(self.phase));

            let t = i as f32 / block;
            let gain_left = self.amplitude_left + delta_left * t;
            let gain_right = self.amplitude_right + delta_right * t;

            *left += sample * gain_left;
            *right += sample * gain_right;
        }

        self.amplitude_left = self.target_amplitude_left;
        self.amplitude_right = self.target_amplitude_right;
    }
}

#[inline(always)]
pub(crate) fn wrap_phase(phase: f32) -> f32 {
    phase - phase.floor()
}

/// Frequency of bank slot `index`: 24 steps per octave starting at A1.
pub fn oscillator_frequency(index: usize) -> f32 {
    55.0 * 2.0f32.powf(index as f32 / 24.0)
}
