use pano_brief::BriefError;
use pano_compose::ComposeError;
use pano_core::CoreError;
use pano_fast::FastError;
use pano_homography::{DegeneracyReason, HomographyError};
use pano_match::MatchError;
use thiserror::Error;

/// Every way a stitching run can fail. Each is terminal for the run.
#[derive(Debug, Error)]
pub enum StitchError {
    #[error("Failed to decode image: {0}")]
    DecodeFailure(#[from] image::ImageError),
    #[error("Failed to encode image: {0}")]
    EncodeFailure(image::ImageError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Feature detection failed: {0}")]
    Detection(#[from] FastError),
    #[error("Descriptor computation failed: {0}")]
    Description(#[from] BriefError),
    #[error("Not enough good matches: found {found}, need at least {required}")]
    InsufficientCorrespondences { found: usize, required: usize },
    #[error("Degenerate configuration: {0}")]
    DegenerateConfiguration(DegeneracyReason),
    #[error("Compositing failed: {0}")]
    Compose(#[from] ComposeError),
    #[error(transparent)]
    Core(CoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CoreError> for StitchError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidConfig(msg) => StitchError::InvalidConfig(msg),
            other => StitchError::Core(other),
        }
    }
}

impl From<MatchError> for StitchError {
    fn from(err: MatchError) -> Self {
        StitchError::InvalidConfig(err.to_string())
    }
}

impl From<HomographyError> for StitchError {
    fn from(err: HomographyError) -> Self {
        match err {
            HomographyError::InsufficientCorrespondences { found, required } => {
                StitchError::InsufficientCorrespondences { found, required }
            }
            HomographyError::DegenerateConfiguration(reason) => StitchError::DegenerateConfiguration(reason),
        }
    }
}

pub type StitchResult<T> = Result<T, StitchError>;
