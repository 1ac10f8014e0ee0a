use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BriefError {
    #[error("Keypoint refers to pyramid level {octave}, pyramid has {levels} levels")]
    UnknownOctave { octave: u8, levels: usize },
    #[error("Pyramid level {level} has inconsistent buffer for {width}x{height}")]
    InvalidLevel { level: usize, width: usize, height: usize },
}

pub type BriefResult<T> = Result<T, BriefError>;
