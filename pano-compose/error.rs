use pano_core::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComposeError {
    #[error("Channel mismatch: first image has {first} channels, second has {second}")]
    ChannelMismatch { first: usize, second: usize },
    #[error("Canvas transform is not invertible")]
    NonInvertible,
    #[error("Corner ({x}, {y}) of the second image maps to infinity")]
    PointAtInfinity { x: f64, y: f64 },
    #[error("Canvas {width}x{height} exceeds the limit of {limit} pixels per side")]
    CanvasTooLarge { width: usize, height: usize, limit: usize },
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ComposeResult<T> = Result<T, ComposeError>;
