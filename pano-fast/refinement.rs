use crate::corner_detection::CornerDetector;
use crate::pyramid::PyramidLevel;
use crate::types::ScoredCorner;

/// Subpixel refinement, orientation and suppression of detected corners
pub struct KeypointRefinement;

impl KeypointRefinement {
    /// 3x3 non-maximum suppression on the corner response. Equal responses
    /// are resolved in favour of the earlier pixel in raster order.
    pub fn non_maximum_suppression(corners: &[ScoredCorner], width: usize, height: usize) -> Vec<ScoredCorner> {
        if corners.is_empty() {
            return Vec::new();
        }

        let mut scores = vec![0.0f32; width * height];
        for c in corners {
            scores[c.y * width + c.x] = c.response;
        }

        corners
            .iter()
            .filter(|c| {
                let idx = c.y * width + c.x;
                for ny in c.y.saturating_sub(1)..=(c.y + 1).min(height - 1) {
                    for nx in c.x.saturating_sub(1)..=(c.x + 1).min(width - 1) {
                        let n = ny * width + nx;
                        if n == idx {
                            continue;
                        }
                        let s = scores[n];
                        if s > c.response || (s == c.response && n < idx) {
                            return false;
                        }
                    }
                }
                true
            })
            .copied()
            .collect()
    }

    /// Refine a corner to subpixel accuracy by fitting a quadratic surface to
    /// the 3x3 Harris neighbourhood. Offsets are clamped to half a pixel.
    pub fn refine_subpixel(level: &PyramidLevel, x: usize, y: usize) -> (f32, f32) {
        let width = level.scale_level.width;
        let height = level.scale_level.height;
        // Harris at x +/- 1 needs a 4 pixel margin
        if x < 4 || y < 4 || x + 4 >= width || y + 4 >= height {
            return (x as f32, y as f32);
        }

        let r = |dx: i32, dy: i32| {
            CornerDetector::compute_harris_response(level, (x as i32 + dx) as usize, (y as i32 + dy) as usize)
        };
        let center = r(0, 0);

        let dx = (r(1, 0) - r(-1, 0)) / 2.0;
        let dy = (r(0, 1) - r(0, -1)) / 2.0;
        let dxx = r(1, 0) - 2.0 * center + r(-1, 0);
        let dyy = r(0, 1) - 2.0 * center + r(0, -1);
        let dxy = (r(1, 1) - r(-1, 1) - r(1, -1) + r(-1, -1)) / 4.0;

        let det = dxx * dyy - dxy * dxy;
        if !det.is_finite() || det.abs() < 1e-6 {
            return (x as f32, y as f32);
        }

        // Newton step towards the extremum
        let offset_x = (-(dyy * dx - dxy * dy) / det).clamp(-0.5, 0.5);
        let offset_y = (-(dxx * dy - dxy * dx) / det).clamp(-0.5, 0.5);

        (x as f32 + offset_x, y as f32 + offset_y)
    }

    /// Orientation by the intensity centroid of a circular patch of radius
    /// `half_patch` centred on `(x, y)`. Returns radians in (-pi, pi].
    pub fn compute_orientation(level: &PyramidLevel, x: usize, y: usize, half_patch: usize) -> f32 {
        let width = level.scale_level.width as i64;
        let height = level.scale_level.height as i64;
        let half = half_patch as i64;
        let (cx, cy) = (x as i64, y as i64);

        let mut m10 = 0i64;
        let mut m01 = 0i64;

        for dy in -half..=half {
            let yy = cy + dy;
            if yy < 0 || yy >= height {
                continue;
            }
            for dx in -half..=half {
                let xx = cx + dx;
                if xx < 0 || xx >= width || dx * dx + dy * dy > half * half {
                    continue;
                }
                let val = level.at(xx as usize, yy as usize) as i64;
                m10 += dx * val;
                m01 += dy * val;
            }
        }

        if m10 == 0 && m01 == 0 {
            0.0
        } else {
            (m01 as f32).atan2(m10 as f32)
        }
    }
}
