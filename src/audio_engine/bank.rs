use crate::nodes::{Oscillator, PdMode};
use crate::traits::OscillatorBank;

/// One scalar [`Oscillator`] per slot.
#[derive(Debug, Clone)]
pub struct ScalarBank {
    oscillators: Vec<Oscillator>,
}

impl ScalarBank {
    pub fn oscillators(&self) -> &[Oscillator] {
        &self.oscillators
    }
}

impl OscillatorBank for ScalarBank {
    fn build(sample_rate: f32, frequencies: &[f32], phases: &[f32]) -> Self {
        debug_assert_eq!(frequencies.len(), phases.len());
        let oscillators = frequencies
            .iter()
            .zip(phases)
            .map(|(&frequency, &phase)| Oscillator::new(sample_rate, frequency, phase))
            .collect();
        Self { oscillators }
    }

    fn len(&self) -> usize {
        self.oscillators.len()
    }

    fn frequency(&self, index: usize) -> f32 {
        self.oscillators[index].frequency()
    }

    fn set_pd_mode(&mut self, pd_mode: PdMode) {
        for oscillator in &mut self.oscillators {
            oscillator.set_pd_mode(pd_mode);
        }
    }

    fn set_pd_distort(&mut self, pd_distort: f32) {
        for oscillator in &mut self.oscillators {
            oscillator.set_pd_distort(pd_distort);
        }
    }

    #[inline]
    fn set_target_amplitude(&mut self, index: usize, left: f32, right: f32) {
        self.oscillators[index].set_target_amplitudes(left, right);
    }

    fn target_amplitude(&self, index: usize) -> (f32, f32) {
        self.oscillators[index].target_amplitude()
    }

    fn amplitude(&self, index: usize) -> (f32, f32) {
        self.oscillators[index].amplitude()
    }

    fn process_add(&mut self, out_left: &mut [f32], out_right: &mut [f32]) {
        for oscillator in &mut self.oscillators {
            oscillator.process_add(out_left, out_right);
        }
    }
}

#[cfg(feature = "simd")]
pub use vector::VectorBank;

#[cfg(feature = "simd")]
mod vector {
    use crate::nodes::{Oscillator8, PdMode, OSCILLATOR_VECTOR_SIZE};
    use crate::traits::OscillatorBank;

    /// Slots packed eight to an [`Oscillator8`]; the last group may be partly idle.
    #[derive(Debug, Clone)]
    pub struct VectorBank {
        groups: Vec<Oscillator8>,
        len: usize,
    }

    impl VectorBank {
        pub fn groups(&self) -> &[Oscillator8] {
            &self.groups
        }

        #[inline(always)]
        fn locate(index: usize) -> (usize, usize) {
            (index / OSCILLATOR_VECTOR_SIZE, index % OSCILLATOR_VECTOR_SIZE)
        }
    }

    impl OscillatorBank for VectorBank {
        fn build(sample_rate: f32, frequencies: &[f32], phases: &[f32]) -> Self {
            debug_assert_eq!(frequencies.len(), phases.len());
            let groups = frequencies
                .chunks(OSCILLATOR_VECTOR_SIZE)
                .zip(phases.chunks(OSCILLATOR_VECTOR_SIZE))
                .map(|(freq_chunk, phase_chunk)| {
                    // Idle lanes repeat the last real slot so they stay numerically tame.
                    let last = freq_chunk.len() - 1;
                    let lane_freqs: [f32; 8] =
                        std::array::from_fn(|lane| freq_chunk[lane.min(last)]);
                    let lane_phases: [f32; 8] =
                        std::array::from_fn(|lane| phase_chunk[lane.min(last)]);
                    Oscillator8::with_active_lanes(
                        sample_rate,
                        lane_freqs,
                        lane_phases,
                        freq_chunk.len(),
                    )
                })
                .collect();
            Self {
                groups,
                len: frequencies.len(),
            }
        }

        fn len(&self) -> usize {
            self.len
        }

        fn frequency(&self, index: usize) -> f32 {
            let (group, lane) = Self::locate(index);
            self.groups[group].frequencies()[lane]
        }

        fn set_pd_mode(&mut self, pd_mode: PdMode) {
            for group in &mut self.groups {
                group.set_pd_mode(pd_mode);
            }
        }

        fn set_pd_distort(&mut self, pd_distort: f32) {
            for group in &mut self.groups {
                group.set_pd_distort(pd_distort);
            }
        }

        #[inline]
        fn set_target_amplitude(&mut self, index: usize, left: f32, right: f32) {
            assert!(index < self.len, "oscillator index {} out of range", index);
            let (group, lane) = Self::locate(index);
            self.groups[group].set_target_amplitude(lane, left, right);
        }

        fn target_amplitude(&self, index: usize) -> (f32, f32) {
            let (group, lane) = Self::locate(index);
            self.groups[group].target_amplitude(lane)
        }

        fn amplitude(&self, index: usize) -> (f32, f32) {
            let (group, lane) = Self::locate(index);
            self.groups[group].amplitude(lane)
        }

        fn process_add(&mut self, out_left: &mut [f32], out_right: &mut [f32]) {
            for group in &mut self.groups {
                group.process_add(out_left, out_right);
            }
        }
    }
}
