use rayon::prelude::*;

use crate::pyramid::PyramidLevel;
use crate::types::ScoredCorner;
use crate::utils::has_consecutive_bits;

/// Contiguous arc length required by the FAST-9 segment test
const FAST_ARC: u32 = 9;

/// Corner detection algorithms (FAST segment test, Harris ranking)
pub struct CornerDetector;

impl CornerDetector {
    /// FAST circle offsets for corner detection
    pub const FAST_OFFSETS: [(i32, i32); 16] = [
        (0, -3), (1, -3), (2, -2), (3, -1),
        (3, 0), (3, 1), (2, 2), (1, 3),
        (0, 3), (-1, 3), (-2, 2), (-3, 1),
        (-3, 0), (-3, -1), (-2, -2), (-1, -3),
    ];

    /// Detect FAST-9 corners on one level, rows in parallel. Corners closer
    /// than `border` to the level edge and corners with a non-positive Harris
    /// response are dropped. Output is in raster order.
    pub fn detect_corners(level: &PyramidLevel, threshold: u8, border: usize) -> Vec<ScoredCorner> {
        let width = level.scale_level.width;
        let height = level.scale_level.height;
        let border = border.max(4);
        if width <= 2 * border || height <= 2 * border {
            return Vec::new();
        }

        (border..height - border)
            .into_par_iter()
            .flat_map_iter(|y| {
                let mut row = Vec::new();
                for x in border..width - border {
                    if Self::is_fast_corner(level, x, y, threshold) {
                        let response = Self::compute_harris_response(level, x, y);
                        if response > 0.0 {
                            row.push(ScoredCorner { x, y, response });
                        }
                    }
                }
                row
            })
            .collect()
    }

    /// Segment test: 9 contiguous circle pixels all brighter than
    /// `center + threshold` or all darker than `center - threshold`.
    pub fn is_fast_corner(level: &PyramidLevel, x: usize, y: usize, threshold: u8) -> bool {
        let center = level.at(x, y) as i32;
        let threshold = threshold as i32;

        let mut brighter: u16 = 0;
        let mut darker: u16 = 0;
        for (i, &(dx, dy)) in Self::FAST_OFFSETS.iter().enumerate() {
            let px = (x as i32 + dx) as usize;
            let py = (y as i32 + dy) as usize;
            let pixel = level.at(px, py) as i32;
            if pixel > center + threshold {
                brighter |= 1 << i;
            } else if pixel < center - threshold {
                darker |= 1 << i;
            }
        }

        // At least 9 bits must be set in one of the masks before a run is possible
        (brighter.count_ones() >= FAST_ARC && has_consecutive_bits(brighter, FAST_ARC))
            || (darker.count_ones() >= FAST_ARC && has_consecutive_bits(darker, FAST_ARC))
    }

    /// Harris response `det(M) - k * trace(M)^2` over a 5x5 window of Sobel
    /// gradients. Needs a 3 pixel margin; returns 0 closer to the edge.
    pub fn compute_harris_response(level: &PyramidLevel, x: usize, y: usize) -> f32 {
        let width = level.scale_level.width;
        let height = level.scale_level.height;
        if x < 3 || y < 3 || x + 3 >= width || y + 3 >= height {
            return 0.0;
        }

        let mut ixx = 0.0f64;
        let mut ixy = 0.0f64;
        let mut iyy = 0.0f64;

        for ny in y - 2..=y + 2 {
            for nx in x - 2..=x + 2 {
                let (gx, gy) = Self::compute_gradients(level, nx, ny);
                ixx += (gx * gx) as f64;
                ixy += (gx * gy) as f64;
                iyy += (gy * gy) as f64;
            }
        }

        let k = 0.04f64;
        let det = ixx * iyy - ixy * ixy;
        let trace = ixx + iyy;
        (det - k * trace * trace) as f32
    }

    /// Compute image gradients using Sobel operator
    fn compute_gradients(level: &PyramidLevel, x: usize, y: usize) -> (f32, f32) {
        let p = |dx: i32, dy: i32| level.at((x as i32 + dx) as usize, (y as i32 + dy) as usize) as f32;

        // Sobel X kernel: [-1, 0, 1; -2, 0, 2; -1, 0, 1]
        let gx = p(1, -1) + 2.0 * p(1, 0) + p(1, 1) - p(-1, -1) - 2.0 * p(-1, 0) - p(-1, 1);

        // Sobel Y kernel: [-1, -2, -1; 0, 0, 0; 1, 2, 1]
        let gy = p(-1, 1) + 2.0 * p(0, 1) + p(1, 1) - p(-1, -1) - 2.0 * p(0, -1) - p(1, -1);

        (gx / 8.0, gy / 8.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScaleLevel;

    fn level_from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> PyramidLevel {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        PyramidLevel {
            scale_level: ScaleLevel { level: 0, scale: 1.0, width, height },
            pixels,
        }
    }

    /// Bright square on a dark background
    fn square_level() -> PyramidLevel {
        level_from_fn(40, 40, |x, y| {
            if (15..25).contains(&x) && (15..25).contains(&y) { 220 } else { 30 }
        })
    }

    #[test]
    fn test_uniform_level_has_no_corners() {
        let level = level_from_fn(40, 40, |_, _| 128);
        assert!(CornerDetector::detect_corners(&level, 20, 5).is_empty());
    }

    #[test]
    fn test_square_corner_passes_segment_test() {
        let level = square_level();
        assert!(CornerDetector::is_fast_corner(&level, 15, 15, 20));
        assert!(!CornerDetector::is_fast_corner(&level, 20, 20, 20));
        // Straight edge: only 7 circle pixels differ
        assert!(!CornerDetector::is_fast_corner(&level, 20, 15, 20));
    }

    #[test]
    fn test_detects_square_corners_only_near_corners() {
        let level = square_level();
        let corners = CornerDetector::detect_corners(&level, 20, 5);
        assert!(!corners.is_empty());
        let square_corners = [(15, 15), (24, 15), (15, 24), (24, 24)];
        for c in &corners {
            assert!(c.response > 0.0);
            let near = square_corners
                .iter()
                .any(|&(cx, cy)| (c.x as i32 - cx).abs() <= 3 && (c.y as i32 - cy).abs() <= 3);
            assert!(near, "unexpected corner at ({}, {})", c.x, c.y);
        }
    }

    #[test]
    fn test_border_is_respected() {
        let level = square_level();
        let corners = CornerDetector::detect_corners(&level, 20, 16);
        assert!(corners.iter().all(|c| c.x >= 16 && c.x < 24 && c.y >= 16 && c.y < 24));
    }

    #[test]
    fn test_harris_prefers_corner_over_edge() {
        let level = square_level();
        let corner = CornerDetector::compute_harris_response(&level, 15, 15);
        let edge = CornerDetector::compute_harris_response(&level, 20, 15);
        let flat = CornerDetector::compute_harris_response(&level, 5, 5);
        assert!(corner > 0.0);
        assert!(edge < corner);
        assert_eq!(flat, 0.0);
    }

    #[test]
    fn test_output_is_raster_ordered() {
        let level = level_from_fn(64, 64, |x, y| if (x / 6 + y / 6) % 2 == 0 { 200 } else { 40 });
        let corners = CornerDetector::detect_corners(&level, 20, 4);
        for pair in corners.windows(2) {
            assert!((pair[0].y, pair[0].x) < (pair[1].y, pair[1].x));
        }
    }
}
