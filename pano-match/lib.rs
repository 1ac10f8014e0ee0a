//! Descriptor matching: brute-force k nearest neighbours under Hamming
//! distance, followed by Lowe's ratio test.

mod error;
mod filter;
mod matcher;

pub use error::{MatchError, MatchResult};
pub use filter::RatioTest;
pub use matcher::DescriptorMatcher;
