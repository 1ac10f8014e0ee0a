use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FastError {
    #[error("Invalid threshold: {0} (must be 1-127)")]
    InvalidThreshold(u8),
    #[error("Invalid patch size {patch_size} (must be odd and >= 7)")]
    InvalidPatchSize { patch_size: usize },
    #[error("Edge threshold {edge_threshold} must exceed half of patch size {patch_size}")]
    InvalidEdgeThreshold { edge_threshold: usize, patch_size: usize },
    #[error("Invalid pyramid: {n_levels} levels with scale factor {scale_factor}")]
    InvalidPyramid { n_levels: usize, scale_factor: f32 },
    #[error("Invalid feature budget: {0}")]
    InvalidMaxFeatures(usize),
    #[error("Detection needs a single-channel image, got {0} channels")]
    NotGrayscale(usize),
}

pub type FastResult<T> = Result<T, FastError>;
