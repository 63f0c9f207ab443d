pub mod bank;
pub mod synth;

pub use bank::ScalarBank;
#[cfg(feature = "simd")]
pub use bank::VectorBank;
pub use synth::Synth;

/// Bank used when no type is named: the 8-lane bank when `simd` is enabled.
#[cfg(feature = "simd")]
pub type DefaultBank = VectorBank;
#[cfg(not(feature = "simd"))]
pub type DefaultBank = ScalarBank;
