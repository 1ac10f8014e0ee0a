use pano_core::{Homography, Image, Interpolation};
use rayon::prelude::*;

/// Slack for coordinates that land on the last row or column up to rounding
const EDGE_EPS: f64 = 1e-6;

/// Inverse-map every canvas pixel through `inverse` (canvas to source) and
/// resample `src`. Pixels whose source position falls outside `src` are left
/// untouched. Rows are processed in parallel.
pub fn warp_into(src: &Image, inverse: &Homography, canvas: &mut Image, interpolation: Interpolation) {
    debug_assert_eq!(src.channels(), canvas.channels());
    let width = canvas.width();
    let channels = canvas.channels();
    let stride = canvas.row_stride();
    let m = *inverse.matrix();

    canvas
        .as_raw_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let yf = y as f64;
            for x in 0..width {
                let xf = x as f64;
                let w = m[(2, 0)] * xf + m[(2, 1)] * yf + m[(2, 2)];
                if w.abs() < 1e-12 {
                    continue;
                }
                let sx = (m[(0, 0)] * xf + m[(0, 1)] * yf + m[(0, 2)]) / w;
                let sy = (m[(1, 0)] * xf + m[(1, 1)] * yf + m[(1, 2)]) / w;

                let out = &mut row[x * channels..(x + 1) * channels];
                match interpolation {
                    Interpolation::Nearest => {
                        sample_nearest(src, sx, sy, out);
                    }
                    Interpolation::Bilinear => {
                        sample_bilinear(src, sx, sy, out);
                    }
                }
            }
        });
}

/// Nearest-neighbour sample into `out`. Returns false (and leaves `out`
/// alone) outside the image.
pub fn sample_nearest(src: &Image, x: f64, y: f64, out: &mut [u8]) -> bool {
    let (rx, ry) = (x.round(), y.round());
    if !(rx >= 0.0 && ry >= 0.0 && rx < src.width() as f64 && ry < src.height() as f64) {
        return false;
    }
    out.copy_from_slice(src.pixel(rx as usize, ry as usize));
    true
}

/// Bilinear sample into `out`, defined on `[0, w-1] x [0, h-1]`. Returns
/// false (and leaves `out` alone) outside that range.
pub fn sample_bilinear(src: &Image, x: f64, y: f64, out: &mut [u8]) -> bool {
    let max_x = (src.width() - 1) as f64;
    let max_y = (src.height() - 1) as f64;
    if !(x >= -EDGE_EPS && y >= -EDGE_EPS && x <= max_x + EDGE_EPS && y <= max_y + EDGE_EPS) {
        return false;
    }
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = src.pixel(x0, y0);
    let p10 = src.pixel(x1, y0);
    let p01 = src.pixel(x0, y1);
    let p11 = src.pixel(x1, y1);

    for (c, o) in out.iter_mut().enumerate() {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        *o = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    true
}
