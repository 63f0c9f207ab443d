#![cfg_attr(feature = "simd", feature(portable_simd))]

pub mod audio;
pub mod audio_engine;
pub mod automation;
pub mod config;
pub mod error;
pub mod image;
pub mod nodes;
pub mod playback;
pub mod render;
pub mod score;
pub mod traits;
pub mod utils;

pub use audio::{RingBuffer, RingConsumer, RingProducer};
pub use audio_engine::{DefaultBank, ScalarBank, Synth};
pub use automation::{ControlFrame, PayloadView};
pub use config::{CanvasConfig, PhaseInit};
pub use error::{CanvasError, Result};
pub use image::PixelImage;
pub use nodes::{oscillator_frequency, Oscillator, PdMode};
pub use playback::PlaybackCursor;
pub use render::{render_image, render_to_wav, write_wav, RenderSettings, RenderedAudio};
pub use traits::OscillatorBank;

#[cfg(feature = "simd")]
pub use audio_engine::VectorBank;
#[cfg(feature = "simd")]
pub use nodes::Oscillator8;
