//! Synthetic raster generators for imagery tests.
//!
//! These generators create predictable, verifiable pixel patterns so that
//! placement and sampling can be checked pixel by pixel.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};

/// Creates a square tile filled with a single colour.
pub fn solid_tile(size: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(size, size, Rgb(color))
}

/// Creates a tile whose pixels encode their own position.
///
/// Each pixel is `(x % 256, y % 256, (x + y) % 256)`, which makes it easy to
/// verify which source pixel a resampler picked.
///
/// # Example
///
/// ```
/// use test_utils::coordinate_tile;
///
/// let tile = coordinate_tile(4, 3);
/// assert_eq!(tile.get_pixel(2, 1).0, [2, 1, 3]);
/// ```
pub fn coordinate_tile(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Encodes any image as PNG bytes.
pub fn encode_png(image: &DynamicImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .expect("PNG encoding of an in-memory image");
    buffer.into_inner()
}

/// Creates a 32-bit RGBA PNG filled with one colour, like a `png32` export.
pub fn solid_png32(size: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(size, size, Rgba(color));
    encode_png(&DynamicImage::ImageRgba8(image))
}

/// Creates a 24-bit RGB PNG filled with one colour.
pub fn solid_png(size: u32, color: [u8; 3]) -> Vec<u8> {
    encode_png(&DynamicImage::ImageRgb8(solid_tile(size, color)))
}
