//! Nearest-neighbour pixelation.
//!
//! Output pixels sample the source pixel under their centre; no averaging
//! takes place, so block edges stay hard. Equal sizes map 1:1.

use terrain_common::{PixelError, PixelResult};
use tracing::debug;

use crate::raster::{PixelMatrix, RasterImage};

/// Resize `image` to a `target_resolution × target_resolution` pixel matrix.
///
/// Rows come out top to bottom, each row left to right.
pub fn downsample(image: RasterImage, target_resolution: u32) -> PixelResult<PixelMatrix> {
    if target_resolution == 0 {
        return Err(PixelError::validation("target resolution must be positive"));
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PixelError::validation("cannot downsample an empty image"));
    }

    let columns: Vec<u32> = (0..target_resolution)
        .map(|x| nearest_source_index(x, width, target_resolution))
        .collect();
    let rows: Vec<u32> = (0..target_resolution)
        .map(|y| nearest_source_index(y, height, target_resolution))
        .collect();

    let mut pixels = Vec::with_capacity(columns.len() * rows.len());
    for &src_y in &rows {
        for &src_x in &columns {
            pixels.push(image.pixel(src_x, src_y));
        }
    }

    debug!(
        src_width = width,
        src_height = height,
        target = target_resolution,
        "Downsampled raster"
    );

    PixelMatrix::new(target_resolution, pixels)
}

/// Source index whose cell contains the centre of destination cell `dst`.
///
/// `floor((dst + 0.5) * src_len / dst_len)` in integer arithmetic.
#[inline]
fn nearest_source_index(dst: u32, src_len: u32, dst_len: u32) -> u32 {
    let numerator = (2 * dst as u64 + 1) * src_len as u64;
    let index = numerator / (2 * dst_len as u64);
    (index as u32).min(src_len - 1)
}
