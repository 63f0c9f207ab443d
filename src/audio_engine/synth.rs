use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::audio::{RingConsumer, RingProducer, RingBuffer};
use crate::automation::PayloadView;
use crate::config::{payload_len, CanvasConfig, PhaseInit};
use crate::error::{CanvasError, Result};
use crate::nodes::{oscillator_frequency, prepare_sine_table, PdMode};
use crate::traits::OscillatorBank;

use super::DefaultBank;

const OUTPUT_CHANNELS: usize = 2;

/// Oscillator bank driver: one fixed-pitch oscillator per image row, fed by
/// control payloads from a ring buffer.
pub struct Synth<B: OscillatorBank = DefaultBank> {
    sample_rate: f32,
    bank: B,
    ring: Option<RingConsumer<f32>>,
    payload_len: usize,
    pd_mode: PdMode,
    pd_distort: f32,
}

impl Synth<DefaultBank> {
    pub fn new(sample_rate: f32, oscillator_count: usize, phase_init: PhaseInit) -> Self {
        Self::build(sample_rate, oscillator_count, phase_init)
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::build_from_config(config)
    }

    /// Build a synth together with a ring buffer sized for its payload.
    /// The returned producer is the only writer the synth will ever see.
    pub fn with_ring_buffer(config: &CanvasConfig) -> Result<(Self, RingProducer<f32>)> {
        Self::build_with_ring_buffer(config)
    }
}

impl<B: OscillatorBank> Synth<B> {
    pub fn build(sample_rate: f32, oscillator_count: usize, phase_init: PhaseInit) -> Self {
        // Banks outside this crate may never touch the table before the first block.
        prepare_sine_table();
        let frequencies: Vec<f32> = (0..oscillator_count).map(oscillator_frequency).collect();
        let phases = initial_phases(oscillator_count, phase_init);
        let bank = B::build(sample_rate, &frequencies, &phases);

        log::info!(
            "synth ready: {} oscillators at {} Hz ({:?} phases)",
            oscillator_count,
            sample_rate,
            phase_init
        );
        if let (Some(low), Some(high)) = (frequencies.first(), frequencies.last()) {
            log::debug!("oscillator range {:.2} Hz .. {:.2} Hz", low, high);
        }

        Self {
            sample_rate,
            bank,
            ring: None,
            payload_len: payload_len(oscillator_count),
            pd_mode: PdMode::default(),
            pd_distort: 0.0,
        }
    }

    pub fn build_from_config(config: &CanvasConfig) -> Self {
        let mut synth = Self::build(
            config.sample_rate,
            config.oscillator_count,
            config.phase_init,
        );
        synth.set_pd_mode(config.pd_mode);
        synth.set_pd_distort(config.pd_distort);
        synth
    }

    pub fn build_with_ring_buffer(config: &CanvasConfig) -> Result<(Self, RingProducer<f32>)> {
        let (producer, consumer) = RingBuffer::<f32>::new(config.ring_capacity())?;
        let mut synth = Self::build_from_config(config);
        synth.attach_ring(consumer)?;
        Ok((synth, producer))
    }

    /// Connect the consumer half this synth drains once per block.
    pub fn attach_ring(&mut self, consumer: RingConsumer<f32>) -> Result<()> {
        if consumer.capacity() < self.payload_len {
            return Err(CanvasError::PayloadTooLarge {
                len: self.payload_len,
                capacity: consumer.capacity(),
            });
        }
        log::debug!(
            "ring attached: capacity {} for {}-sample payloads",
            consumer.capacity(),
            self.payload_len
        );
        self.ring = Some(consumer);
        Ok(())
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn oscillator_count(&self) -> usize {
        self.bank.len()
    }

    pub fn payload_len(&self) -> usize {
        self.payload_len
    }

    pub fn bank(&self) -> &B {
        &self.bank
    }

    pub fn pd_mode(&self) -> PdMode {
        self.pd_mode
    }

    pub fn pd_distort(&self) -> f32 {
        self.pd_distort
    }

    pub fn set_pd_mode(&mut self, pd_mode: PdMode) {
        self.pd_mode = pd_mode;
        self.bank.set_pd_mode(pd_mode);
    }

    pub fn set_pd_distort(&mut self, pd_distort: f32) {
        self.pd_distort = pd_distort;
        self.bank.set_pd_distort(pd_distort);
    }

    /// Direct target update for the offline path. Ignores out-of-range indices.
    #[inline]
    pub fn set_oscillator_amplitude(&mut self, index: usize, left: f32, right: f32) {
        if index < self.bank.len() {
            self.bank.set_target_amplitude(index, left, right);
        }
    }

    pub fn target_amplitude(&self, index: usize) -> (f32, f32) {
        self.bank.target_amplitude(index)
    }

    /// Apply one complete payload. Anything other than exactly one payload is
    /// ignored and `false` is returned.
    pub fn apply_payload(&mut self, payload: &[f32]) -> bool {
        match PayloadView::new(payload, self.bank.len()) {
            Some(view) => {
                Self::apply_view(
                    &mut self.bank,
                    &mut self.pd_mode,
                    &mut self.pd_distort,
                    view,
                );
                true
            }
            None => false,
        }
    }

    /// Drain the ring buffer once. Returns `true` when a full payload was
    /// applied; on underrun (or no ring) every target stays as it was.
    pub fn update_from_ring_buffer(&mut self) -> bool {
        let Some(ring) = self.ring.as_mut() else {
            return false;
        };
        let count = ring.read();
        if count < self.payload_len {
            return false;
        }

        // Several frames may have queued up; only the newest one matters.
        let start = count - self.payload_len;
        let samples = &ring.output()[start..count];
        match PayloadView::new(samples, self.bank.len()) {
            Some(view) => {
                Self::apply_view(
                    &mut self.bank,
                    &mut self.pd_mode,
                    &mut self.pd_distort,
                    view,
                );
                true
            }
            None => false,
        }
    }

    #[inline]
    fn apply_view(bank: &mut B, pd_mode: &mut PdMode, pd_distort: &mut f32, view: PayloadView) {
        *pd_mode = view.pd_mode();
        *pd_distort = view.pd_distort();
        bank.set_pd_mode(*pd_mode);
        bank.set_pd_distort(*pd_distort);
        for (index, (left, right)) in view.amplitudes().enumerate() {
            bank.set_target_amplitude(index, left, right);
        }
    }

    /// Render `frame_count` frames into two non-interleaved channels.
    ///
    /// # Panics
    ///
    /// Panics unless exactly two channels are supplied, each holding at least
    /// `frame_count` samples.
    pub fn process(&mut self, outputs: &mut [&mut [f32]], frame_count: usize) {
        assert_eq!(
            outputs.len(),
            OUTPUT_CHANNELS,
            "synth renders exactly {} channels, got {}",
            OUTPUT_CHANNELS,
            outputs.len()
        );
        let (left, right) = outputs.split_at_mut(1);
        self.process_stereo(&mut left[0][..frame_count], &mut right[0][..frame_count]);
    }

    /// Zero both channels and accumulate every oscillator into them.
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        assert_eq!(
            left.len(),
            right.len(),
            "stereo channels must have equal length"
        );
        left.fill(0.0);
        right.fill(0.0);
        self.bank.process_add(left, right);
    }

    /// Callback entry point: exactly one ring drain, then one block.
    pub fn process_realtime(&mut self, outputs: &mut [&mut [f32]], frame_count: usize) {
        self.update_from_ring_buffer();
        self.process(outputs, frame_count);
    }
}

fn initial_phases(count: usize, phase_init: PhaseInit) -> Vec<f32> {
    match phase_init {
        PhaseInit::Zero => vec![0.0; count],
        PhaseInit::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..count).map(|_| rng.random::<f32>()).collect()
        }
    }
}
