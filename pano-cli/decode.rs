use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use pano_core::{CoreError, Image};

use crate::error::{StitchError, StitchResult};

/// Decode an encoded buffer (PNG, JPEG, ...) into a 3-channel image.
pub fn decode_image(bytes: &[u8]) -> StitchResult<Image> {
    let decoded = image::load_from_memory(bytes)?;
    from_dynamic(decoded)
}

/// Read and decode an image file into a 3-channel image.
pub fn load_image<P: AsRef<Path>>(path: P) -> StitchResult<Image> {
    let bytes = std::fs::read(path)?;
    decode_image(&bytes)
}

pub fn from_dynamic(img: DynamicImage) -> StitchResult<Image> {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    Ok(Image::new(w as usize, h as usize, 3, rgb.into_raw())?)
}

/// Convert back to an `image` buffer, grayscale expanded to RGB.
pub fn to_rgb_image(img: &Image) -> StitchResult<RgbImage> {
    let (w, h) = (img.width() as u32, img.height() as u32);
    let rgb = match img.channels() {
        3 => RgbImage::from_raw(w, h, img.as_raw().to_vec()),
        _ => GrayImage::from_raw(w, h, img.as_raw().to_vec()).map(|g| DynamicImage::ImageLuma8(g).to_rgb8()),
    };
    rgb.ok_or(StitchError::Core(CoreError::InvalidImageData {
        expected_len: img.width() * img.height() * img.channels(),
        actual_len: img.as_raw().len(),
    }))
}

/// Encode and write an image, format chosen by the file extension.
pub fn save_image<P: AsRef<Path>>(img: &Image, path: P) -> StitchResult<()> {
    to_rgb_image(img)?.save(path).map_err(StitchError::EncodeFailure)?;
    Ok(())
}
