//! Multi-scale oriented FAST keypoint detection.
//!
//! The detector builds an image pyramid, runs the FAST-9 segment test on
//! every level, ranks candidates by Harris response, suppresses
//! non-maxima, refines to sub-pixel accuracy and assigns an orientation
//! from the intensity centroid. Keypoints are reported in base image
//! coordinates.

mod corner_detection;
mod detector;
mod error;
mod pyramid;
mod refinement;
mod types;
mod utils;

pub use corner_detection::CornerDetector;
pub use detector::{Detection, FastDetector};
pub use error::{FastError, FastResult};
pub use pyramid::{ImagePyramid, PyramidLevel};
pub use refinement::KeypointRefinement;
pub use types::{ScaleLevel, ScoredCorner};
