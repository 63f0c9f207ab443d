pub mod oscillator;
#[cfg(feature = "simd")]
pub mod oscillator8;
pub mod phase_distortion;
pub mod sine_table;

pub use oscillator::*;
#[cfg(feature = "simd")]
pub use oscillator8::*;
pub use phase_distortion::*;
pub use sine_table::{prepare as prepare_sine_table, SINE_TABLE, SINE_TABLE_SIZE};
