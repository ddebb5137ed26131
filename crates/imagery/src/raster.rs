//! Raster and pixel matrix types.

use image::{DynamicImage, RgbImage};
use serde::{Serialize, Serializer};
use terrain_common::{PixelError, PixelResult};

/// One RGB triple, each channel 0-255.
pub type Rgb = [u8; 3];

/// A decoded RGB raster, used for both single tiles and mosaics.
///
/// Alpha is dropped on construction from decoded imagery.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pixels: RgbImage,
}

impl RasterImage {
    pub fn new(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Convert any decoded image to 3-channel RGB.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::new(image.to_rgb8())
    }

    /// Decode an encoded image payload (PNG, JPEG, ...).
    pub fn decode(bytes: &[u8]) -> PixelResult<Self> {
        image::load_from_memory(bytes)
            .map(Self::from_dynamic)
            .map_err(|e| PixelError::Decode(e.to_string()))
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Pixel at column `x`, row `y` (row 0 is the northern edge).
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels.get_pixel(x, y).0
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn into_inner(self) -> RgbImage {
        self.pixels
    }
}

impl From<RgbImage> for RasterImage {
    fn from(pixels: RgbImage) -> Self {
        Self::new(pixels)
    }
}

/// The final square pixel grid, row-major, top row first.
///
/// Serializes as a bare JSON array of `[r, g, b]` arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMatrix {
    resolution: u32,
    pixels: Vec<Rgb>,
}

impl PixelMatrix {
    /// Wrap a row-major pixel list. Fails unless it holds `resolution²` entries.
    pub fn new(resolution: u32, pixels: Vec<Rgb>) -> PixelResult<Self> {
        let expected = resolution as usize * resolution as usize;
        if pixels.len() != expected {
            return Err(PixelError::validation(format!(
                "pixel matrix of resolution {} needs {} pixels, got {}",
                resolution,
                expected,
                pixels.len()
            )));
        }
        Ok(Self { resolution, pixels })
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Pixel at column `x`, row `y`.
    pub fn get(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.resolution || y >= self.resolution {
            return None;
        }
        self.pixels
            .get(y as usize * self.resolution as usize + x as usize)
            .copied()
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<Rgb> {
        self.pixels
    }
}

impl Serialize for PixelMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.pixels.serialize(serializer)
    }
}
