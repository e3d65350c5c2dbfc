//! Image difference hash (dHash).
//!
//! The image is resized to a 9×8 grid with a triangle filter and converted to
//! Rec.601 luma. Each row yields 8 bits by comparing horizontally adjacent
//! cells: a brighter-or-equal left cell gives 0, a darker one gives 1. Bits are
//! packed row-major with the first comparison in the most significant bit.
//!
//! The hash survives re-compression, format changes and small colour shifts.
//! It does not survive cropping or rotation.

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use tracing::debug;

use crate::config::PerceptualError;
use crate::hash::Hash64;

const GRID_WIDTH: u32 = 9;
const GRID_HEIGHT: u32 = 8;

/// Rec.601 luma of an RGB triple.
#[inline]
pub(crate) fn luma601(r: u8, g: u8, b: u8) -> f32 {
    0.299 * f32::from(r) + 0.587 * f32::from(g) + 0.114 * f32::from(b)
}

/// Compute the dHash of a decoded image.
pub fn hash_image(img: &DynamicImage) -> Hash64 {
    let grid = img
        .resize_exact(GRID_WIDTH, GRID_HEIGHT, FilterType::Triangle)
        .to_rgb8();

    let mut bits = Vec::with_capacity(64);
    for y in 0..GRID_HEIGHT {
        for x in 0..GRID_WIDTH - 1 {
            let [lr, lg, lb] = grid.get_pixel(x, y).0;
            let [rr, rg, rb] = grid.get_pixel(x + 1, y).0;
            bits.push(luma601(lr, lg, lb) < luma601(rr, rg, rb));
        }
    }
    Hash64::from_bits(bits)
}

/// Decode image bytes and compute their dHash.
///
/// `mime` selects the decoder (`image/png`, `image/jpeg`, `image/webp`,
/// `image/gif`, `image/bmp`). Unknown or mismatched types fall back to
/// sniffing the content.
pub fn hash_image_bytes(bytes: &[u8], mime: &str) -> Result<Hash64, PerceptualError> {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    let decoded = match ImageFormat::from_mime_type(essence) {
        Some(format) => image::load_from_memory_with_format(bytes, format).or_else(|err| {
            debug!(mime = essence, error = %err, "image_declared_format_failed");
            image::load_from_memory(bytes)
        }),
        None => image::load_from_memory(bytes),
    };
    let img = decoded.map_err(|err| PerceptualError::ImageDecode(err.to_string()))?;
    Ok(hash_image(&img))
}
