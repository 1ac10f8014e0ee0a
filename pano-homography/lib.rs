//! Homography estimation from point correspondences.
//!
//! [`HomographyEstimator`] runs RANSAC over minimal four-point samples
//! solved with the normalized direct linear transform, then refits the
//! winning hypothesis on all of its inliers.

mod dlt;
mod error;
mod ransac;

pub use dlt::{fit_homography, is_degenerate_sample, normalize_points, reprojection_error};
pub use error::{DegeneracyReason, HomographyError, HomographyResult};
pub use ransac::{Estimate, HomographyEstimator, SAMPLE_SIZE};

/// A point in the second image (`src`) and its counterpart in the first
/// image (`dst`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correspondence {
    pub src: (f64, f64),
    pub dst: (f64, f64),
}

impl Correspondence {
    pub fn new(src: (f64, f64), dst: (f64, f64)) -> Self {
        Self { src, dst }
    }
}
