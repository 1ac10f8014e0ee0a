//! High-level two-image panorama stitching.
//!
//! [`Stitcher`] runs the whole pipeline on decoded images; the [`decode`]
//! and [`visualize`] modules sit at the boundary with encoded files.

pub mod decode;
mod error;
mod pipeline;
pub mod visualize;

pub use error::{StitchError, StitchResult};
pub use pipeline::{Panorama, PipelineStage, StitchReport, Stitcher};

pub use pano_core::{
    self, ComposeConfig, FeatureConfig, Features, Homography, Image, Interpolation, Keypoint, Match, MatchConfig,
    RansacConfig, StitchConfig, init_thread_pool,
};
