use crate::config::payload_len;
use crate::nodes::PdMode;

const PD_MODE_SLOT: usize = 0;
const PD_DISTORT_SLOT: usize = 1;
const AMPLITUDE_OFFSET: usize = 2;

/// One control snapshot in ring-buffer layout:
/// `[pd_mode, pd_distort, left_0, right_0, left_1, right_1, ...]`.
///
/// The frame owns a single flat buffer so the producer can hand it to
/// [`RingProducer::write`](crate::audio::RingProducer::write) in one call.
#[derive(Clone, Debug, PartialEq)]
pub struct ControlFrame {
    oscillator_count: usize,
    samples: Vec<f32>,
}

impl ControlFrame {
    pub fn with_oscillators(oscillator_count: usize) -> Self {
        let mut samples = vec![0.0; payload_len(oscillator_count)];
        samples[PD_MODE_SLOT] = PdMode::default().as_payload();
        Self {
            oscillator_count,
            samples,
        }
    }

    pub fn oscillator_count(&self) -> usize {
        self.oscillator_count
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn pd_mode(&self) -> PdMode {
        PdMode::from_payload(self.samples[PD_MODE_SLOT])
    }

    pub fn pd_distort(&self) -> f32 {
        self.samples[PD_DISTORT_SLOT]
    }

    pub fn set_pd_mode(&mut self, pd_mode: PdMode) {
        self.samples[PD_MODE_SLOT] = pd_mode.as_payload();
    }

    pub fn set_pd_distort(&mut self, pd_distort: f32) {
        self.samples[PD_DISTORT_SLOT] = pd_distort;
    }

    pub fn amplitude(&self, index: usize) -> (f32, f32) {
        let slot = amplitude_slot(index);
        (self.samples[slot], self.samples[slot + 1])
    }

    /// Out-of-range indices are ignored.
    pub fn set_amplitude(&mut self, index: usize, left: f32, right: f32) {
        if index >= self.oscillator_count {
            return;
        }
        let slot = amplitude_slot(index);
        self.samples[slot] = left;
        self.samples[slot + 1] = right;
    }

    pub fn silence(&mut self) {
        self.samples[AMPLITUDE_OFFSET..].fill(0.0);
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

/// View over a received payload. Returns `None` unless `samples` holds exactly
/// the header plus `oscillator_count` stereo pairs.
#[derive(Clone, Copy, Debug)]
pub struct PayloadView<'a> {
    samples: &'a [f32],
}

impl<'a> PayloadView<'a> {
    pub fn new(samples: &'a [f32], oscillator_count: usize) -> Option<Self> {
        (samples.len() == payload_len(oscillator_count)).then_some(Self { samples })
    }

    #[inline]
    pub fn pd_mode(&self) -> PdMode {
        PdMode::from_payload(self.samples[PD_MODE_SLOT])
    }

    #[inline]
    pub fn pd_distort(&self) -> f32 {
        self.samples[PD_DISTORT_SLOT]
    }

    /// Stereo pairs in oscillator order.
    #[inline]
    pub fn amplitudes(&self) -> impl Iterator<Item = (f32, f32)> + 'a {
        self.samples[AMPLITUDE_OFFSET..]
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
    }
}

#[inline(always)]
fn amplitude_slot(index: usize) -> usize {
    AMPLITUDE_OFFSET + 2 * index
}
