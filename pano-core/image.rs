use crate::error::{CoreError, CoreResult};

/// Row-major, channel-interleaved 8-bit image with 1 (gray) or 3 (RGB) channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Image {
    /// Wrap a raw sample buffer, validating its shape.
    pub fn new(width: usize, height: usize, channels: usize, data: Vec<u8>) -> CoreResult<Self> {
        if width == 0 || height == 0 {
            return Err(CoreError::InvalidImageSize { width, height });
        }
        if channels != 1 && channels != 3 {
            return Err(CoreError::UnsupportedChannels(channels));
        }
        let expected_len = width * height * channels;
        if data.len() != expected_len {
            return Err(CoreError::InvalidImageData {
                expected_len,
                actual_len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// All-zero image of the given shape.
    pub fn zeros(width: usize, height: usize, channels: usize) -> CoreResult<Self> {
        Self::new(width, height, channels, vec![0; width * height * channels])
    }

    /// Grayscale image whose pixel values come from `f(x, y)`.
    pub fn from_fn_gray(width: usize, height: usize, f: impl Fn(usize, usize) -> u8) -> CoreResult<Self> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, 1, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Number of samples in one row.
    pub fn row_stride(&self) -> usize {
        self.width * self.channels
    }

    /// Samples of the pixel at `(x, y)`; panics when out of bounds.
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u8] {
        let start = (y * self.width + x) * self.channels;
        &mut self.data[start..start + self.channels]
    }

    /// Single-channel copy. RGB is reduced with integer BT.601 weights.
    pub fn to_luma(&self) -> Image {
        if self.channels == 1 {
            return self.clone();
        }
        let data = self
            .data
            .chunks_exact(3)
            .map(|px| {
                let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
                ((77 * r + 150 * g + 29 * b + 128) >> 8) as u8
            })
            .collect();
        Image {
            width: self.width,
            height: self.height,
            channels: 1,
            data,
        }
    }
}
