//! Shared data model for the panorama pipeline: pixel buffers, keypoints,
//! binary descriptors, matches, projective transforms and configuration.

mod config;
mod error;
mod features;
mod homography;
mod image;

pub use config::{ComposeConfig, FeatureConfig, Interpolation, MatchConfig, RansacConfig, StitchConfig};
pub use error::{CoreError, CoreResult};
pub use features::{hamming_distance, Descriptor, Features, Keypoint, Match, DESCRIPTOR_BYTES};
pub use homography::Homography;
pub use image::Image;

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}
