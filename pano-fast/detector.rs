use pano_core::{FeatureConfig, Image, Keypoint};
use rayon::prelude::*;
use tracing::debug;

use crate::corner_detection::CornerDetector;
use crate::error::{FastError, FastResult};
use crate::pyramid::ImagePyramid;
use crate::refinement::KeypointRefinement;

/// Keypoints of one image together with the pyramid they were found on,
/// which the descriptor stage samples from.
#[derive(Debug, Clone)]
pub struct Detection {
    pub keypoints: Vec<Keypoint>,
    pub pyramid: ImagePyramid,
}

/// Main FAST corner detector with multi-scale capability
#[derive(Debug, Clone)]
pub struct FastDetector {
    cfg: FeatureConfig,
}

impl FastDetector {
    /// Creates a new FAST detector with validation
    pub fn new(cfg: FeatureConfig) -> FastResult<Self> {
        // 0 would detect everything, >127 could cause issues with u8 arithmetic
        if cfg.fast_threshold == 0 || cfg.fast_threshold > 127 {
            return Err(FastError::InvalidThreshold(cfg.fast_threshold));
        }
        if cfg.patch_size < 7 || cfg.patch_size % 2 == 0 {
            return Err(FastError::InvalidPatchSize {
                patch_size: cfg.patch_size,
            });
        }
        if cfg.edge_threshold <= cfg.patch_size / 2 {
            return Err(FastError::InvalidEdgeThreshold {
                edge_threshold: cfg.edge_threshold,
                patch_size: cfg.patch_size,
            });
        }
        if cfg.n_levels == 0 || !(cfg.scale_factor > 1.0) {
            return Err(FastError::InvalidPyramid {
                n_levels: cfg.n_levels,
                scale_factor: cfg.scale_factor,
            });
        }
        if cfg.max_features == 0 {
            return Err(FastError::InvalidMaxFeatures(cfg.max_features));
        }
        Ok(Self { cfg })
    }

    /// Detect oriented keypoints on a single-channel image.
    ///
    /// Keypoints are ordered by descending response (ties by octave, then
    /// row, then column) and truncated to `max_features`. Images without
    /// corners, or too small for the border margin, give an empty result.
    pub fn detect(&self, gray: &Image) -> FastResult<Detection> {
        if gray.channels() != 1 {
            return Err(FastError::NotGrayscale(gray.channels()));
        }

        let (width, height) = gray.dimensions();
        let min_size = 2 * self.cfg.edge_threshold + 1;
        let scale_levels =
            ImagePyramid::generate_scale_levels(width, height, self.cfg.n_levels, self.cfg.scale_factor, min_size);
        let pyramid = ImagePyramid::build(gray, &scale_levels);

        let per_level: Vec<Vec<Keypoint>> = pyramid
            .levels()
            .par_iter()
            .map(|level| {
                let sl = &level.scale_level;
                let corners = CornerDetector::detect_corners(level, self.cfg.fast_threshold, self.cfg.edge_threshold);
                let suppressed = KeypointRefinement::non_maximum_suppression(&corners, sl.width, sl.height);
                suppressed
                    .into_iter()
                    .map(|c| {
                        let (lx, ly) = KeypointRefinement::refine_subpixel(level, c.x, c.y);
                        let angle = KeypointRefinement::compute_orientation(level, c.x, c.y, self.cfg.patch_size / 2);
                        let (x, y) = sl.to_base(lx, ly);
                        Keypoint {
                            x,
                            y,
                            size: self.cfg.patch_size as f32 * sl.scale,
                            angle,
                            response: c.response,
                            octave: sl.level as u8,
                        }
                    })
                    .collect()
            })
            .collect();

        let mut keypoints: Vec<Keypoint> = per_level.into_iter().flatten().collect();
        let found = keypoints.len();
        Self::sort_by_response(&mut keypoints);
        keypoints.truncate(self.cfg.max_features);

        debug!(
            width,
            height,
            levels = pyramid.len(),
            found,
            kept = keypoints.len(),
            "detected keypoints"
        );

        Ok(Detection { keypoints, pyramid })
    }

    /// Strongest first; deterministic for equal responses.
    fn sort_by_response(keypoints: &mut [Keypoint]) {
        keypoints.sort_by(|a, b| {
            b.response
                .total_cmp(&a.response)
                .then(a.octave.cmp(&b.octave))
                .then(a.y.total_cmp(&b.y))
                .then(a.x.total_cmp(&b.x))
        });
    }

    /// Get detector configuration
    pub fn config(&self) -> &FeatureConfig {
        &self.cfg
    }
}
