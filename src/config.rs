use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};
use crate::nodes::PdMode;

pub const DEFAULT_SAMPLE_RATE: f32 = 48_000.0;
pub const DEFAULT_BLOCK_SIZE: usize = 256;
pub const DEFAULT_RENDER_BLOCK_SIZE: usize = 64;
pub const DEFAULT_OSCILLATOR_COUNT: usize = 239;
pub const DEFAULT_IMAGE_WIDTH: usize = 640;

/// How oscillator phases are seeded when a synth is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PhaseInit {
    #[default]
    Zero,
    Random {
        seed: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub sample_rate: f32,
    /// Engine block used by the realtime host.
    pub block_size: usize,
    /// Block used by the offline renderer.
    pub render_block_size: usize,
    pub oscillator_count: usize,
    pub image_width: usize,
    pub overall_gain: f32,
    pub speed_px_per_sec: f32,
    pub pd_mode: PdMode,
    pub pd_distort: f32,
    pub phase_init: PhaseInit,
    pub frame_interval_ms: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            block_size: DEFAULT_BLOCK_SIZE,
            render_block_size: DEFAULT_RENDER_BLOCK_SIZE,
            oscillator_count: DEFAULT_OSCILLATOR_COUNT,
            image_width: DEFAULT_IMAGE_WIDTH,
            overall_gain: 0.1,
            speed_px_per_sec: 100.0,
            pd_mode: PdMode::Pulsar,
            pd_distort: 0.0,
            phase_init: PhaseInit::Zero,
            frame_interval_ms: 16,
        }
    }
}

impl CanvasConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: CanvasConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "sample_rate must be positive, got {}",
                self.sample_rate
            )));
        }
        if self.block_size == 0 || self.render_block_size == 0 {
            return Err(CanvasError::InvalidConfig(
                "block sizes must be at least one frame".to_string(),
            ));
        }
        if self.oscillator_count == 0 {
            return Err(CanvasError::InvalidConfig(
                "oscillator_count must be at least 1".to_string(),
            ));
        }
        if self.image_width == 0 {
            return Err(CanvasError::InvalidConfig(
                "image_width must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pd_distort) {
            return Err(CanvasError::InvalidConfig(format!(
                "pd_distort must lie in [0, 1], got {}",
                self.pd_distort
            )));
        }
        if !(self.overall_gain >= 0.0) {
            return Err(CanvasError::InvalidConfig(format!(
                "overall_gain must be non-negative, got {}",
                self.overall_gain
            )));
        }
        Ok(())
    }

    /// Samples in one control payload: two distortion params plus a stereo pair per row.
    pub fn payload_len(&self) -> usize {
        payload_len(self.oscillator_count)
    }

    pub fn ring_capacity(&self) -> usize {
        self.payload_len().next_power_of_two()
    }
}

pub fn payload_len(oscillator_count: usize) -> usize {
    2 + 2 * oscillator_count
}
