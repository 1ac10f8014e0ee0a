use thiserror::Error;

/// Why no homography could be supported by the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DegeneracyReason {
    #[error("no sample produced a non-singular transform")]
    NoValidSample,
    #[error("best hypothesis has only {inliers} inliers")]
    TooFewInliers { inliers: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HomographyError {
    #[error("Not enough correspondences: found {found}, need at least {required}")]
    InsufficientCorrespondences { found: usize, required: usize },
    #[error("Degenerate configuration: {0}")]
    DegenerateConfiguration(DegeneracyReason),
}

pub type HomographyResult<T> = Result<T, HomographyError>;
