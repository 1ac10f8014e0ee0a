use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Invalid image dimensions: {width}x{height} (must be > 0)")]
    InvalidImageSize { width: usize, height: usize },
    #[error("Unsupported channel count: {0} (expected 1 or 3)")]
    UnsupportedChannels(usize),
    #[error("Image data length mismatch: expected {expected_len}, got {actual_len}")]
    InvalidImageData { expected_len: usize, actual_len: usize },
    #[error("Keypoint/descriptor count mismatch: {keypoints} keypoints, {descriptors} descriptors")]
    FeatureCountMismatch { keypoints: usize, descriptors: usize },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
