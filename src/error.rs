use thiserror::Error;

pub type Result<T> = std::result::Result<T, CanvasError>;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("ring buffer capacity {requested} cannot be satisfied")]
    RingCapacity { requested: usize },

    #[error("payload of {len} samples exceeds ring capacity {capacity}")]
    PayloadTooLarge { len: usize, capacity: usize },

    #[error("Speed is too slow to render audio.")]
    SpeedTooSlow,

    #[error("render of {frames} frames exceeds the {max} frames a WAV file can hold")]
    RenderTooLong { frames: usize, max: usize },

    #[error("cannot allocate {frames} frames of render output")]
    RenderAlloc { frames: usize },

    #[error("File name must end in .{expected}")]
    BadExtension { expected: &'static str },

    #[error("image has no pixels to render")]
    EmptyImage,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Audio rendering failed: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Config(#[from] serde_json::Error),
}
