use pano_core::Homography;

use crate::error::{ComposeError, ComposeResult};

/// Homogeneous `w` below which a corner counts as mapped to infinity
const MIN_W: f64 = 1e-9;

/// Size of the output canvas and where both images land on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasLayout {
    pub width: usize,
    pub height: usize,
    /// Position of the first image's origin on the canvas
    pub offset: (usize, usize),
    /// Maps second-image coordinates to canvas coordinates
    pub transform: Homography,
}

impl CanvasLayout {
    /// Bounding box of the first image's corners and the second image's
    /// corners projected through `h`. Corners are taken at pixel edges,
    /// `(0, 0)` to `(w, h)`, and the box is widened to whole pixels.
    pub fn compute(
        first: (usize, usize),
        second: (usize, usize),
        h: &Homography,
        max_side: usize,
    ) -> ComposeResult<Self> {
        let (fw, fh) = (first.0 as f64, first.1 as f64);
        let (sw, sh) = (second.0 as f64, second.1 as f64);

        let mut x_min = 0.0f64;
        let mut y_min = 0.0f64;
        let mut x_max = fw;
        let mut y_max = fh;

        for (x, y) in [(0.0, 0.0), (sw, 0.0), (sw, sh), (0.0, sh)] {
            if h.homogeneous_w(x, y) <= MIN_W {
                return Err(ComposeError::PointAtInfinity { x, y });
            }
            let (px, py) = h.project(x, y).ok_or(ComposeError::PointAtInfinity { x, y })?;
            x_min = x_min.min(px);
            y_min = y_min.min(py);
            x_max = x_max.max(px);
            y_max = y_max.max(py);
        }

        let x_min = x_min.floor();
        let y_min = y_min.floor();
        let x_max = x_max.ceil();
        let y_max = y_max.ceil();

        let limit = max_side as f64;
        let (w, hgt) = (x_max - x_min, y_max - y_min);
        if !(w <= limit && hgt <= limit) {
            return Err(ComposeError::CanvasTooLarge {
                width: if w.is_finite() && w < usize::MAX as f64 { w as usize } else { usize::MAX },
                height: if hgt.is_finite() && hgt < usize::MAX as f64 { hgt as usize } else { usize::MAX },
                limit: max_side,
            });
        }

        Ok(Self {
            width: w as usize,
            height: hgt as usize,
            offset: ((-x_min) as usize, (-y_min) as usize),
            transform: h.translated(-x_min, -y_min),
        })
    }
}
