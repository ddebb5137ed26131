//! 3×3 tile mosaic assembly.
//!
//! Tiles are requested south to north (`dy = -1, 0, 1`) and west to east
//! (`dx = -1, 0, 1`). Raster rows grow downward while latitude grows
//! northward, so the row band is inverted when placing tiles: `dy = +1`
//! lands in the top band and `dy = -1` in the bottom band.
//!
//! ```text
//!            dx=-1   dx=0   dx=+1
//!  dy=+1  │   6   │   7   │   8   │  row band 0 (north)
//!  dy= 0  │   3   │   4   │   5   │  row band 1
//!  dy=-1  │   0   │   1   │   2   │  row band 2 (south)
//! ```

use image::{GenericImage, RgbImage};
use terrain_common::{PixelError, PixelResult};

use crate::raster::RasterImage;

/// Tiles per mosaic side.
pub const GRID_DIM: u32 = 3;

/// Tiles per mosaic.
pub const GRID_TILES: usize = (GRID_DIM * GRID_DIM) as usize;

/// One cell of the 3×3 grid, as latitude/longitude step counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileGridPosition {
    pub dy: i32,
    pub dx: i32,
}

impl TileGridPosition {
    /// The middle cell, also used for single-tile requests.
    pub const CENTER: TileGridPosition = TileGridPosition { dy: 0, dx: 0 };

    /// Returns `None` unless both steps are in `-1..=1`.
    pub fn new(dy: i32, dx: i32) -> Option<Self> {
        if (-1..=1).contains(&dy) && (-1..=1).contains(&dx) {
            Some(Self { dy, dx })
        } else {
            None
        }
    }

    /// All nine positions in fetch order: outer loop `dy`, inner loop `dx`.
    pub fn all() -> [TileGridPosition; GRID_TILES] {
        let mut positions = [Self::CENTER; GRID_TILES];
        for (i, slot) in positions.iter_mut().enumerate() {
            *slot = Self::from_index(i).unwrap_or(Self::CENTER);
        }
        positions
    }

    /// Position for fetch-order index `i` (0..9).
    pub fn from_index(i: usize) -> Option<Self> {
        if i >= GRID_TILES {
            return None;
        }
        Some(Self {
            dy: (i / 3) as i32 - 1,
            dx: (i % 3) as i32 - 1,
        })
    }

    /// Fetch-order index, `dy_index * 3 + dx_index`.
    pub fn index(&self) -> usize {
        ((self.dy + 1) * 3 + (self.dx + 1)) as usize
    }

    /// Row band in the mosaic, 0 = top (north).
    pub fn row_band(&self) -> u32 {
        (1 - self.dy) as u32
    }

    /// Column band in the mosaic, 0 = left (west).
    pub fn col_band(&self) -> u32 {
        (self.dx + 1) as u32
    }
}

/// Compose nine `tile_size × tile_size` tiles, given in fetch order, into a
/// single `3·tile_size` square raster with no gaps or blending.
pub fn assemble(tiles: Vec<RasterImage>, tile_size: u32) -> PixelResult<RasterImage> {
    if tiles.len() != GRID_TILES {
        return Err(PixelError::validation(format!(
            "mosaic needs {} tiles, got {}",
            GRID_TILES,
            tiles.len()
        )));
    }
    if tile_size == 0 {
        return Err(PixelError::validation("tile size must be positive"));
    }

    for (index, tile) in tiles.iter().enumerate() {
        let (width, height) = tile.dimensions();
        if width != tile_size || height != tile_size {
            return Err(PixelError::TileSizeMismatch {
                index,
                expected: tile_size,
                width,
                height,
            });
        }
    }

    let side = tile_size * GRID_DIM;
    let mut canvas = RgbImage::new(side, side);

    for (index, tile) in tiles.into_iter().enumerate() {
        let position = TileGridPosition::from_index(index).unwrap_or(TileGridPosition::CENTER);
        let x = position.col_band() * tile_size;
        let y = position.row_band() * tile_size;
        let (width, height) = tile.dimensions();
        canvas
            .copy_from(tile.as_rgb(), x, y)
            .map_err(|_| PixelError::TileSizeMismatch {
                index,
                expected: tile_size,
                width,
                height,
            })?;
    }

    Ok(RasterImage::new(canvas))
}
