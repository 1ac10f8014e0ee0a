use nalgebra::{Matrix3, Vector3};

const DEGENERATE_EPS: f64 = 1e-12;

/// 3x3 projective transform mapping homogeneous second-image coordinates into
/// the first image's frame. Always scale-normalized so that `h[2][2] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Homography {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    /// Pure translation by `(dx, dy)`.
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            matrix: Matrix3::new(1.0, 0.0, dx, 0.0, 1.0, dy, 0.0, 0.0, 1.0),
        }
    }

    /// Normalize an arbitrary matrix. Returns `None` when the bottom-right
    /// entry vanishes, an entry is not finite, or the matrix is singular.
    pub fn from_matrix(matrix: Matrix3<f64>) -> Option<Self> {
        let scale = matrix[(2, 2)];
        if !scale.is_finite() || scale.abs() < DEGENERATE_EPS {
            return None;
        }
        let normalized = matrix / scale;
        if normalized.iter().any(|v| !v.is_finite()) {
            return None;
        }
        if normalized.determinant().abs() < DEGENERATE_EPS {
            return None;
        }
        Some(Self { matrix: normalized })
    }

    /// Row-major constructor, normalized like [`Homography::from_matrix`].
    pub fn from_row_slice(values: &[f64; 9]) -> Option<Self> {
        Self::from_matrix(Matrix3::from_row_slice(values))
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Row-major entries.
    pub fn to_array(&self) -> [f64; 9] {
        let m = &self.matrix;
        [
            m[(0, 0)],
            m[(0, 1)],
            m[(0, 2)],
            m[(1, 0)],
            m[(1, 1)],
            m[(1, 2)],
            m[(2, 0)],
            m[(2, 1)],
            m[(2, 2)],
        ]
    }

    /// Homogeneous `w` of the projected point; non-positive values mean the
    /// point lies on or behind the line at infinity.
    pub fn homogeneous_w(&self, x: f64, y: f64) -> f64 {
        let m = &self.matrix;
        m[(2, 0)] * x + m[(2, 1)] * y + m[(2, 2)]
    }

    /// Project a point, or `None` if it maps to infinity.
    pub fn project(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let p = self.matrix * Vector3::new(x, y, 1.0);
        if p.z.abs() < DEGENERATE_EPS {
            return None;
        }
        Some((p.x / p.z, p.y / p.z))
    }

    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().and_then(Self::from_matrix)
    }

    /// `T * self` where `T` translates by `(dx, dy)`. The bottom row is
    /// untouched, so the result stays normalized.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            matrix: Self::translation(dx, dy).matrix * self.matrix,
        }
    }

    pub fn translation_components(&self) -> (f64, f64) {
        (self.matrix[(0, 2)], self.matrix[(1, 2)])
    }
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}
