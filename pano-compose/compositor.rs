use pano_core::{ComposeConfig, Homography, Image};
use tracing::debug;

use crate::error::{ComposeError, ComposeResult};
use crate::layout::CanvasLayout;
use crate::warp::warp_into;

/// Warps the second image into the first image's frame and pastes the
/// first image over it (last writer wins).
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: ComposeConfig,
}

impl Compositor {
    pub fn new(config: ComposeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// `h` maps `second` coordinates into `first` coordinates.
    pub fn composite(&self, first: &Image, second: &Image, h: &Homography) -> ComposeResult<Image> {
        if first.channels() != second.channels() {
            return Err(ComposeError::ChannelMismatch {
                first: first.channels(),
                second: second.channels(),
            });
        }

        let layout = CanvasLayout::compute(first.dimensions(), second.dimensions(), h, self.config.max_canvas_side)?;
        let inverse = layout.transform.inverse().ok_or(ComposeError::NonInvertible)?;
        debug!(
            width = layout.width,
            height = layout.height,
            offset_x = layout.offset.0,
            offset_y = layout.offset.1,
            "canvas layout"
        );

        let mut canvas = Image::zeros(layout.width, layout.height, first.channels())?;
        warp_into(second, &inverse, &mut canvas, self.config.interpolation);
        Self::paste(first, &mut canvas, layout.offset);

        Ok(canvas)
    }

    /// Copy `src` row by row onto `canvas` at `offset`, overwriting.
    fn paste(src: &Image, canvas: &mut Image, offset: (usize, usize)) {
        let (ox, oy) = offset;
        let channels = src.channels();
        let src_stride = src.row_stride();
        let dst_stride = canvas.row_stride();
        let start = ox * channels;
        let dst = canvas.as_raw_mut();
        for (y, row) in src.as_raw().chunks_exact(src_stride).enumerate() {
            let at = (oy + y) * dst_stride + start;
            dst[at..at + src_stride].copy_from_slice(row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pano_core::Interpolation;
    use proptest::prelude::*;

    fn rgb(width: usize, height: usize, f: impl Fn(usize, usize) -> [u8; 3]) -> Image {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Image::new(width, height, 3, data).unwrap()
    }

    #[test]
    fn test_channel_mismatch() {
        let a = Image::zeros(10, 10, 3).unwrap();
        let b = Image::zeros(10, 10, 1).unwrap();
        let err = Compositor::default().composite(&a, &b, &Homography::identity()).unwrap_err();
        assert_eq!(err, ComposeError::ChannelMismatch { first: 3, second: 1 });
    }

    #[test]
    fn test_first_image_overwrites_overlap() {
        let a = rgb(40, 30, |_, _| [10, 20, 30]);
        let b = rgb(40, 30, |_, _| [200, 100, 50]);
        // Second image overlaps the right half of the first
        let h = Homography::translation(20.0, 0.0);
        let canvas = Compositor::default().composite(&a, &b, &h).unwrap();

        assert_eq!(canvas.dimensions(), (60, 30));
        assert_eq!(canvas.pixel(0, 0), &[10, 20, 30]);
        assert_eq!(canvas.pixel(25, 10), &[10, 20, 30]);
        assert_eq!(canvas.pixel(39, 29), &[10, 20, 30]);
        assert_eq!(canvas.pixel(40, 10), &[200, 100, 50]);
        assert_eq!(canvas.pixel(59, 29), &[200, 100, 50]);
    }

    #[test]
    fn test_negative_offset_places_first_image() {
        let a = rgb(30, 20, |x, y| [x as u8, y as u8, 7]);
        let b = rgb(30, 20, |_, _| [1, 2, 3]);
        let h = Homography::translation(-12.0, -4.0);
        let canvas = Compositor::new(ComposeConfig {
            interpolation: Interpolation::Nearest,
            ..ComposeConfig::default()
        })
        .composite(&a, &b, &h)
        .unwrap();

        assert_eq!(canvas.dimensions(), (42, 24));
        assert_eq!(canvas.pixel(12, 4), a.pixel(0, 0));
        assert_eq!(canvas.pixel(41, 23), a.pixel(29, 19));
        assert_eq!(canvas.pixel(0, 0), &[1, 2, 3]);
        // Not covered by either image
        assert_eq!(canvas.pixel(41, 0), &[0, 0, 0]);
    }

    #[test]
    fn test_canvas_limit_is_enforced() {
        let a = Image::zeros(10, 10, 1).unwrap();
        let config = ComposeConfig {
            max_canvas_side: 15,
            ..ComposeConfig::default()
        };
        let err = Compositor::new(config)
            .composite(&a, &a, &Homography::translation(8.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, ComposeError::CanvasTooLarge { width: 18, .. }));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_first_image_lands_at_offset(
            a in 0.7f64..1.3, b in -0.2f64..0.2, c in -40.0f64..40.0,
            d in -0.2f64..0.2, e in 0.7f64..1.3, f in -40.0f64..40.0,
            g in -5e-4f64..5e-4, h in -5e-4f64..5e-4,
            first in (4usize..40, 4usize..40),
            second in (4usize..40, 4usize..40),
        ) {
            let hom = Homography::from_row_slice(&[a, b, c, d, e, f, g, h, 1.0]);
            prop_assume!(hom.is_some());
            let hom = hom.unwrap();
            let img_a = rgb(first.0, first.1, |x, y| [x as u8, y as u8, 99]);
            let img_b = rgb(second.0, second.1, |_, _| [250, 1, 2]);

            let canvas = Compositor::default().composite(&img_a, &img_b, &hom).unwrap();
            let layout = CanvasLayout::compute(first, second, &hom, 16384).unwrap();
            prop_assert_eq!(canvas.dimensions(), (layout.width, layout.height));

            let (ox, oy) = layout.offset;
            prop_assert_eq!(canvas.pixel(ox, oy), img_a.pixel(0, 0));
            prop_assert_eq!(
                canvas.pixel(ox + first.0 - 1, oy + first.1 - 1),
                img_a.pixel(first.0 - 1, first.1 - 1)
            );
        }
    }
}
