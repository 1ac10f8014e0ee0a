use nalgebra::{DMatrix, Matrix3};
use pano_core::Homography;

use crate::Correspondence;

/// Sine of the smallest angle at which three points count as collinear
const COLLINEAR_EPS: f64 = 1e-6;

/// Hartley normalization: move the centroid to the origin and scale so the
/// mean distance from it is `sqrt(2)`. Returns the normalized points and
/// the transform that produced them.
pub fn normalize_points(points: &[(f64, f64)]) -> (Vec<(f64, f64)>, Matrix3<f64>) {
    if points.is_empty() {
        return (Vec::new(), Matrix3::identity());
    }

    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.0).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.1).sum::<f64>() / n;

    let avg_dist = points
        .iter()
        .map(|&(x, y)| ((x - cx).powi(2) + (y - cy).powi(2)).sqrt())
        .sum::<f64>()
        / n;

    if avg_dist < 1e-10 {
        return (points.to_vec(), Matrix3::identity());
    }

    let scale = std::f64::consts::SQRT_2 / avg_dist;
    let normalized = points
        .iter()
        .map(|&(x, y)| ((x - cx) * scale, (y - cy) * scale))
        .collect();

    // Translate then scale
    let t = Matrix3::new(scale, 0.0, -cx * scale, 0.0, scale, -cy * scale, 0.0, 0.0, 1.0);

    (normalized, t)
}

/// Least-squares homography mapping `src` onto `dst` (at least four
/// pairs). Exact for four points in general position.
pub fn fit_homography(src: &[(f64, f64)], dst: &[(f64, f64)]) -> Option<Homography> {
    if src.len() < 4 || src.len() != dst.len() {
        return None;
    }

    let (src_norm, src_t) = normalize_points(src);
    let (dst_norm, dst_t) = normalize_points(dst);

    // Each pair gives two rows of A h = 0:
    // [-x -y -1  0  0  0  x*x'  y*x'  x']
    // [ 0  0  0 -x -y -1  x*y'  y*y'  y']
    // Padded with zero rows so the SVD always yields a full 9x9 V^T.
    let rows = (2 * src_norm.len()).max(9);
    let mut a = DMatrix::<f64>::zeros(rows, 9);
    for (i, (&(x, y), &(xp, yp))) in src_norm.iter().zip(dst_norm.iter()).enumerate() {
        let r = 2 * i;
        let row1 = [-x, -y, -1.0, 0.0, 0.0, 0.0, x * xp, y * xp, xp];
        let row2 = [0.0, 0.0, 0.0, -x, -y, -1.0, x * yp, y * yp, yp];
        for j in 0..9 {
            a[(r, j)] = row1[j];
            a[(r + 1, j)] = row2[j];
        }
    }

    let svd = a.svd(false, true);
    let v_t = svd.v_t?;
    let null = v_t.row(svd.singular_values.imin());
    let h_norm = Matrix3::from_iterator(null.iter().copied()).transpose();

    // Denormalize: H = T_dst^-1 * H_norm * T_src
    let dst_t_inv = dst_t.try_inverse()?;
    Homography::from_matrix(dst_t_inv * h_norm * src_t)
}

/// True when any three of the four points are (nearly) collinear in either
/// image. Such samples cannot determine a homography.
pub fn is_degenerate_sample(sample: &[Correspondence; 4]) -> bool {
    let src = sample.map(|c| c.src);
    let dst = sample.map(|c| c.dst);
    has_collinear_triple(&src) || has_collinear_triple(&dst)
}

fn has_collinear_triple(p: &[(f64, f64); 4]) -> bool {
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    TRIPLES.iter().any(|&(i, j, k)| {
        let (ux, uy) = (p[j].0 - p[i].0, p[j].1 - p[i].1);
        let (vx, vy) = (p[k].0 - p[i].0, p[k].1 - p[i].1);
        let cross = ux * vy - uy * vx;
        let norms = (ux.hypot(uy) * vx.hypot(vy)).max(f64::MIN_POSITIVE);
        cross.abs() <= COLLINEAR_EPS * norms
    })
}

/// Euclidean distance between `H(src)` and `dst`; infinite when `src`
/// maps to infinity.
pub fn reprojection_error(h: &Homography, c: &Correspondence) -> f64 {
    match h.project(c.src.0, c.src.1) {
        Some((x, y)) => (x - c.dst.0).hypot(y - c.dst.1),
        None => f64::INFINITY,
    }
}
