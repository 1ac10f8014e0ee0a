use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    #[error("Invalid neighbour count: {0} (must be >= 1)")]
    InvalidNeighbourCount(usize),
    #[error("Invalid ratio threshold: {0} (must be in (0, 1])")]
    InvalidRatio(f32),
}

pub type MatchResult<T> = Result<T, MatchError>;
