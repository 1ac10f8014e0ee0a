use pano_core::Image;
use rayon::prelude::*;

use crate::types::ScaleLevel;

/// One grayscale pyramid level.
#[derive(Debug, Clone)]
pub struct PyramidLevel {
    pub scale_level: ScaleLevel,
    pub pixels: Vec<u8>,
}

impl PyramidLevel {
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.scale_level.width + x]
    }
}

/// Image pyramid operations for multi-scale feature detection
#[derive(Debug, Clone)]
pub struct ImagePyramid {
    levels: Vec<PyramidLevel>,
}

impl ImagePyramid {
    /// Generate scale levels for image pyramid
    pub fn generate_scale_levels(
        width: usize,
        height: usize,
        n_levels: usize,
        scale_factor: f32,
        min_size: usize,
    ) -> Vec<ScaleLevel> {
        let mut levels = Vec::new();
        let mut current_scale = 1.0f32;

        for level in 0..n_levels {
            let scaled_width = ((width as f32) / current_scale) as usize;
            let scaled_height = ((height as f32) / current_scale) as usize;

            // Stop when image becomes too small for meaningful detection
            if scaled_width < min_size || scaled_height < min_size {
                break;
            }

            levels.push(ScaleLevel {
                level,
                scale: current_scale,
                width: scaled_width,
                height: scaled_height,
            });

            current_scale *= scale_factor;
        }

        levels
    }

    /// Build image pyramid from a single-channel base image
    pub fn build(gray: &Image, scale_levels: &[ScaleLevel]) -> Self {
        let (width, height) = gray.dimensions();
        let levels = scale_levels
            .par_iter()
            .map(|scale_level| {
                let pixels = if scale_level.level == 0 {
                    gray.as_raw().to_vec()
                } else {
                    Self::downsample_image(gray.as_raw(), width, height, scale_level)
                };
                PyramidLevel {
                    scale_level: *scale_level,
                    pixels,
                }
            })
            .collect();
        Self { levels }
    }

    pub fn levels(&self) -> &[PyramidLevel] {
        &self.levels
    }

    pub fn level(&self, index: usize) -> Option<&PyramidLevel> {
        self.levels.get(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Downsample image using bilinear interpolation
    fn downsample_image(img: &[u8], src_width: usize, src_height: usize, target: &ScaleLevel) -> Vec<u8> {
        let mut downsampled = vec![0u8; target.width * target.height];

        for (y, row) in downsampled.chunks_exact_mut(target.width).enumerate() {
            for (x, out) in row.iter_mut().enumerate() {
                let (src_x, src_y) = target.to_base(x as f32, y as f32);
                let value = Self::bilinear_sample(img, src_width, src_height, src_x.max(0.0), src_y.max(0.0));
                *out = value.round().clamp(0.0, 255.0) as u8;
            }
        }

        downsampled
    }

    /// Sample image at fractional coordinates using bilinear interpolation
    fn bilinear_sample(img: &[u8], width: usize, height: usize, x: f32, y: f32) -> f32 {
        let x1 = (x.floor() as usize).min(width - 1);
        let y1 = (y.floor() as usize).min(height - 1);
        let x2 = (x1 + 1).min(width - 1);
        let y2 = (y1 + 1).min(height - 1);

        let fx = x - x1 as f32;
        let fy = y - y1 as f32;

        let p11 = img[y1 * width + x1] as f32;
        let p12 = img[y1 * width + x2] as f32;
        let p21 = img[y2 * width + x1] as f32;
        let p22 = img[y2 * width + x2] as f32;

        let interpolated_top = p11 * (1.0 - fx) + p12 * fx;
        let interpolated_bottom = p21 * (1.0 - fx) + p22 * fx;

        interpolated_top * (1.0 - fy) + interpolated_bottom * fy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_levels_shrink_geometrically() {
        let levels = ImagePyramid::generate_scale_levels(640, 480, 8, 1.2, 33);
        assert_eq!(levels.len(), 8);
        assert_eq!(levels[0].width, 640);
        assert_eq!(levels[0].scale, 1.0);
        for pair in levels.windows(2) {
            assert!(pair[1].width < pair[0].width);
            assert!((pair[1].scale / pair[0].scale - 1.2).abs() < 1e-4);
        }
    }

    #[test]
    fn test_scale_levels_stop_at_min_size() {
        let levels = ImagePyramid::generate_scale_levels(100, 100, 8, 1.2, 33);
        assert!(levels.iter().all(|l| l.width >= 33 && l.height >= 33));
        assert_eq!(levels.len(), 7);
        assert!(ImagePyramid::generate_scale_levels(20, 20, 8, 1.2, 33).is_empty());
    }

    #[test]
    fn test_uniform_image_stays_uniform() {
        let img = Image::from_fn_gray(60, 50, |_, _| 77).unwrap();
        let levels = ImagePyramid::generate_scale_levels(60, 50, 4, 1.5, 8);
        let pyramid = ImagePyramid::build(&img, &levels);
        assert_eq!(pyramid.len(), levels.len());
        for level in pyramid.levels() {
            assert_eq!(level.pixels.len(), level.scale_level.width * level.scale_level.height);
            assert!(level.pixels.iter().all(|&p| p == 77));
        }
    }

    #[test]
    fn test_coordinate_mapping_round_trip() {
        let level = ScaleLevel { level: 2, scale: 1.44, width: 69, height: 69 };
        let (bx, by) = level.to_base(10.0, 20.0);
        let (lx, ly) = level.from_base(bx, by);
        assert!((lx - 10.0).abs() < 1e-4 && (ly - 20.0).abs() < 1e-4);
    }
}
