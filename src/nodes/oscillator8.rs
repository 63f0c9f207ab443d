// oscillator8.rs
use std::simd::prelude::*;
use std::simd::StdFloat;

use super::phase_distortion::{PdMode, PdShape};
use super::sine_table::{self, SINE_TABLE, SINE_TABLE_SIZE};

pub const OSCILLATOR_VECTOR_SIZE: usize = 8;

/// Eight oscillators advanced in lockstep, one per SIMD lane.
///
/// Lane `n` performs exactly the arithmetic of a scalar [`super::Oscillator`]
/// with the same frequency and starting phase, so a bank of these produces
/// the same samples as a bank of scalar oscillators.
#[derive(Debug, Clone)]
pub struct Oscillator8 {
    sample_rate: f32,
    frequencies: f32x8,
    phase_increments: f32x8,
    phases: f32x8,
    amplitudes_left: f32x8,
    amplitudes_right: f32x8,
    target_amplitudes_left: f32x8,
    target_amplitudes_right: f32x8,
    active_lanes: usize,
    pd_mode: PdMode,
    pd_distort: f32,
}

impl Oscillator8 {
    pub fn new(sample_rate: f32, frequencies: [f32; 8], phases: [f32; 8]) -> Self {
        Self::with_active_lanes(sample_rate, frequencies, phases, OSCILLATOR_VECTOR_SIZE)
    }

    /// Lanes at or beyond `active_lanes` still run but never reach the output.
    pub fn with_active_lanes(
        sample_rate: f32,
        frequencies: [f32; 8],
        phases: [f32; 8],
        active_lanes: usize,
    ) -> Self {
        sine_table::prepare();
        Self {
            sample_rate,
            frequencies: f32x8::from_array(frequencies),
            phase_increments: f32x8::from_array(frequencies.map(|f| f / sample_rate)),
            phases: f32x8::from_array(phases.map(|p| p - p.floor())),
            amplitudes_left: f32x8::splat(0.0),
            amplitudes_right: f32x8::splat(0.0),
            target_amplitudes_left: f32x8::splat(0.0),
            target_amplitudes_right: f32x8::splat(0.0),
            active_lanes: active_lanes.min(OSCILLATOR_VECTOR_SIZE),
            pd_mode: PdMode::Pulsar,
            pd_distort: 0.0,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn active_lanes(&self) -> usize {
        self.active_lanes
    }

    pub fn frequencies(&self) -> [f32; 8] {
        self.frequencies.to_array()
    }

    pub fn phases(&self) -> [f32; 8] {
        self.phases.to_array()
    }

    pub fn amplitude(&self, lane: usize) -> (f32, f32) {
        (self.amplitudes_left[lane], self.amplitudes_right[lane])
    }

    pub fn target_amplitude(&self, lane: usize) -> (f32, f32) {
        (
            self.target_amplitudes_left[lane],
            self.target_amplitudes_right[lane],
        )
    }

    pub fn set_target_amplitudes_left(&mut self, amplitudes: f32x8) {
        self.target_amplitudes_left = amplitudes;
    }

    pub fn set_target_amplitudes_right(&mut self, amplitudes: f32x8) {
        self.target_amplitudes_right = amplitudes;
    }

    pub fn set_target_amplitude(&mut self, lane: usize, left: f32, right: f32) {
        self.target_amplitudes_left[lane] = left;
        self.target_amplitudes_right[lane] = right;
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

    pub fn process_add(&mut self, out_left: &mut [f32], out_right: &mut [f32]) {
        let block_size = out_left.len().min(out_right.len());
        if block_size == 0 {
            return;
        }

        let table: &[f32] = &SINE_TABLE[..];
        let mask = u32x8::splat((SINE_TABLE_SIZE - 1) as u32);
        let table_scale = f32x8::splat(SINE_TABLE_SIZE as f32);
        let one = f32x8::splat(1.0);

        let shape = PdShape::new(self.pd_mode, self.pd_distort);
        let delta_left = self.target_amplitudes_left - self.amplitudes_left;
        let delta_right = self.target_amplitudes_right - self.amplitudes_right;
        let block = block_size as f32;
        let lanes = self.active_lanes;

        for i in 0..block_size {
            let advanced = self.phases + self.phase_increments;
            self.phases = advanced - advanced.floor();

            let position = shape.apply_simd(self.phases) * table_scale;
            let whole = position.cast::<u32>();
            let frac = position - whole.cast::<f32>();
            let index = whole & mask;
            let next = (index + u32x8::splat(1)) & mask;

            let current = f32x8::gather_or_default(table, index.cast::<usize>());
            let following = f32x8::gather_or_default(table, next.cast::<usize>());
            let sample = current * (one - frac) + following * frac;

            let t = f32x8::splat(i as f32 / block);
            let gain_left = self.amplitudes_left + delta_left * t;
            let gain_right = self.amplitudes_right + delta_right * t;

            let left = (sample * gain_left).to_array();
            let right = (sample * gain_right).to_array();
            // Lane order matches the scalar bank's oscillator order.
            for lane in 0..lanes {
                out_left[i] += left[lane];
                out_right[i] += right[lane];
            }
        }

        self.amplitudes_left = self.target_amplitudes_left;
        self.amplitudes_right = self.target_amplitudes_right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{oscillator_frequency, Oscillator};

    const SAMPLE_RATE: f32 = 48_000.0;

    fn lane_frequencies(start: usize) -> [f32; 8] {
        std::array::from_fn(|lane| oscillator_frequency(start + lane))
    }

    #[test]
    fn matches_eight_scalar_oscillators_bit_for_bit() {
        let frequencies = lane_frequencies(40);
        let phases: [f32; 8] = std::array::from_fn(|lane| lane as f32 * 0.11);

        let mut vector = Oscillator8::new(SAMPLE_RATE, frequencies, phases);
        let mut scalars: Vec<Oscillator> = (0..8)
            .map(|lane| Oscillator::new(SAMPLE_RATE, frequencies[lane], phases[lane]))
            .collect();

        let modes = [PdMode::Pulsar, PdMode::Saw, PdMode::Square, PdMode::SinePwm];
        for (block, mode) in modes.iter().enumerate() {
            let distort = 0.2 * block as f32 + 0.1;
            vector.set_pd_mode(*mode);
            vector.set_pd_distort(distort);
            for (lane, osc) in scalars.iter_mut().enumerate() {
                let left = 0.1 * (lane + block) as f32;
                let right = 0.05 * (8 - lane) as f32;
                osc.set_pd_mode(*mode);
                osc.set_pd_distort(distort);
                osc.set_target_amplitudes(left, right);
                vector.set_target_amplitude(lane, left, right);
            }

            let mut vec_left = vec![0.0; 64];
            let mut vec_right = vec![0.0; 64];
            vector.process_add(&mut vec_left, &mut vec_right);

            let mut scalar_left = vec![0.0; 64];
            let mut scalar_right = vec![0.0; 64];
            for osc in scalars.iter_mut() {
                osc.process_add(&mut scalar_left, &mut scalar_right);
            }

            assert_eq!(vec_left, scalar_left, "left differs in block {}", block);
            assert_eq!(vec_right, scalar_right, "right differs in block {}", block);
        }

        for (lane, osc) in scalars.iter().enumerate() {
            assert_eq!(vector.phases()[lane], osc.phase());
            assert_eq!(vector.amplitude(lane), osc.amplitude());
        }
    }

    #[test]
    fn inactive_lanes_do_not_reach_output() {
        let mut osc = Oscillator8::with_active_lanes(
            SAMPLE_RATE,
            lane_frequencies(0),
            [0.0; 8],
            3,
        );
        for lane in 3..8 {
            osc.set_target_amplitude(lane, 1.0, 1.0);
        }
        let mut left = vec![0.0; 32];
        let mut right = vec![0.0; 32];
        osc.process_add(&mut left, &mut right);
        osc.process_add(&mut left, &mut right);
        assert!(left.iter().chain(right.iter()).all(|&s| s == 0.0));
    }
}
