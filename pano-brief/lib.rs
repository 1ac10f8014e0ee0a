//! Rotated BRIEF descriptors computed on a smoothed image pyramid.

mod error;
mod pattern;

use image::GrayImage;
use imageproc::filter::gaussian_blur_f32;
use pano_core::{DESCRIPTOR_BYTES, Descriptor, Keypoint};
use pano_fast::{ImagePyramid, PyramidLevel};
use rayon::prelude::*;
use tracing::debug;

pub use error::{BriefError, BriefResult};
pub use pattern::{PATTERN_PAIRS, PATTERN_RADIUS, SamplingPattern, TestPair};

/// Standard deviation of the smoothing applied before sampling
pub const SMOOTHING_SIGMA: f32 = 2.0;

/// Smoothed copy of one pyramid level
struct SmoothedLevel {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct BriefGenerator {
    pattern: SamplingPattern,
}

impl BriefGenerator {
    pub fn new() -> Self {
        Self {
            pattern: SamplingPattern::new(),
        }
    }

    pub fn pattern(&self) -> &SamplingPattern {
        &self.pattern
    }

    /// Describe every keypoint on the pyramid level it was detected on.
    /// Output is index-aligned with `keypoints`.
    pub fn describe(&self, pyramid: &ImagePyramid, keypoints: &[Keypoint]) -> BriefResult<Vec<Descriptor>> {
        if keypoints.is_empty() {
            return Ok(Vec::new());
        }

        let smoothed = pyramid
            .levels()
            .par_iter()
            .map(Self::smooth_level)
            .collect::<BriefResult<Vec<_>>>()?;

        let descriptors = keypoints
            .par_iter()
            .map(|kp| {
                let octave = kp.octave as usize;
                let level = smoothed.get(octave).ok_or(BriefError::UnknownOctave {
                    octave: kp.octave,
                    levels: smoothed.len(),
                })?;
                let (x, y) = pyramid.levels()[octave].scale_level.from_base(kp.x, kp.y);
                Ok(self.describe_at(level, x, y, kp.angle))
            })
            .collect::<BriefResult<Vec<_>>>()?;

        debug!(count = descriptors.len(), levels = smoothed.len(), "computed descriptors");
        Ok(descriptors)
    }

    fn smooth_level(level: &PyramidLevel) -> BriefResult<SmoothedLevel> {
        let sl = level.scale_level;
        let invalid = BriefError::InvalidLevel {
            level: sl.level,
            width: sl.width,
            height: sl.height,
        };
        let gray = GrayImage::from_raw(sl.width as u32, sl.height as u32, level.pixels.clone()).ok_or(invalid)?;
        let blurred = gaussian_blur_f32(&gray, SMOOTHING_SIGMA);
        Ok(SmoothedLevel {
            width: sl.width,
            height: sl.height,
            pixels: blurred.into_raw(),
        })
    }

    fn describe_at(&self, level: &SmoothedLevel, cx: f32, cy: f32, angle: f32) -> Descriptor {
        let (s, c) = angle.sin_cos();
        let mut d = [0u8; DESCRIPTOR_BYTES];

        for (i, pair) in self.pattern.pairs().iter().enumerate() {
            let (dx1, dy1) = (pair.p1.0 as f32, pair.p1.1 as f32);
            let (dx2, dy2) = (pair.p2.0 as f32, pair.p2.1 as f32);

            // Apply rotation and translation for subpixel coordinates
            let (rx1, ry1) = (cx + c * dx1 - s * dy1, cy + s * dx1 + c * dy1);
            let (rx2, ry2) = (cx + c * dx2 - s * dy2, cy + s * dx2 + c * dy2);

            let val1 = Self::bilinear_sample(level, rx1, ry1);
            let val2 = Self::bilinear_sample(level, rx2, ry2);

            let bit = (val1 < val2) as u8;
            d[i / 8] |= bit << (i % 8);
        }
        d
    }

    /// Bilinear interpolation for subpixel sampling
    fn bilinear_sample(level: &SmoothedLevel, x: f32, y: f32) -> f32 {
        let (w, h) = (level.width, level.height);
        let x0 = x.floor();
        let y0 = y.floor();
        let x1 = x0 + 1.0;
        let y1 = y0 + 1.0;

        // Clamp to image bounds for boundary samples
        if x0 < 0.0 || y0 < 0.0 || x1 >= w as f32 || y1 >= h as f32 {
            let cx = x.round().clamp(0.0, (w - 1) as f32) as usize;
            let cy = y.round().clamp(0.0, (h - 1) as f32) as usize;
            return level.pixels[cy * w + cx] as f32;
        }

        let dx = x - x0;
        let dy = y - y0;
        let (x0, y0, x1, y1) = (x0 as usize, y0 as usize, x1 as usize, y1 as usize);

        let p00 = level.pixels[y0 * w + x0] as f32;
        let p10 = level.pixels[y0 * w + x1] as f32;
        let p01 = level.pixels[y1 * w + x0] as f32;
        let p11 = level.pixels[y1 * w + x1] as f32;

        let top = p00 * (1.0 - dx) + p10 * dx;
        let bottom = p01 * (1.0 - dx) + p11 * dx;

        top * (1.0 - dy) + bottom * dy
    }
}
