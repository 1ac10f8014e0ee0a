use image::{Rgb, RgbImage, imageops};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use pano_core::{Image, Keypoint, Match};

use crate::decode::to_rgb_image;
use crate::error::StitchResult;

const PALETTE: [Rgb<u8>; 6] = [
    Rgb([255, 0, 0]),
    Rgb([0, 200, 0]),
    Rgb([40, 90, 255]),
    Rgb([255, 200, 0]),
    Rgb([255, 0, 255]),
    Rgb([0, 220, 220]),
];

/// Image with a circle per keypoint (radius from its size) and a tick
/// showing its orientation.
pub fn draw_keypoints(image: &Image, keypoints: &[Keypoint]) -> StitchResult<RgbImage> {
    let mut output = to_rgb_image(image)?;
    for kp in keypoints {
        let color = PALETTE[kp.octave as usize % PALETTE.len()];
        let radius = (kp.size / 2.0).round().max(3.0);
        draw_hollow_circle_mut(&mut output, (kp.x.round() as i32, kp.y.round() as i32), radius as i32, color);

        let (s, c) = kp.angle.sin_cos();
        draw_line_segment_mut(&mut output, (kp.x, kp.y), (kp.x + c * radius, kp.y + s * radius), color);
    }
    Ok(output)
}

/// Both images side by side with a line joining each matched pair. Only
/// the first `limit` matches are drawn.
pub fn draw_matches(
    first: &Image,
    first_keypoints: &[Keypoint],
    second: &Image,
    second_keypoints: &[Keypoint],
    matches: &[Match],
    limit: usize,
) -> StitchResult<RgbImage> {
    let left = to_rgb_image(first)?;
    let right = to_rgb_image(second)?;
    let width = left.width() + right.width();
    let height = left.height().max(right.height());

    let mut output = RgbImage::new(width, height);
    imageops::overlay(&mut output, &left, 0, 0);
    imageops::overlay(&mut output, &right, left.width() as i64, 0);

    let shift = left.width() as f32;
    for (i, m) in matches.iter().take(limit).enumerate() {
        let (Some(a), Some(b)) = (first_keypoints.get(m.query_idx), second_keypoints.get(m.train_idx)) else {
            continue;
        };
        let color = PALETTE[i % PALETTE.len()];
        let end = (b.x + shift, b.y);
        draw_hollow_circle_mut(&mut output, (a.x.round() as i32, a.y.round() as i32), 3, color);
        draw_hollow_circle_mut(&mut output, (end.0.round() as i32, end.1.round() as i32), 3, color);
        draw_line_segment_mut(&mut output, (a.x, a.y), end, color);
    }
    Ok(output)
}
