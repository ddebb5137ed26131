//! Satellite imagery pipeline.
//!
//! Turns a point and an offset into a fixed-size grid of RGB pixels:
//!
//! ```text
//! Coordinate ──► geodesic bbox(es) ──► TileFetcher (×1 or ×9, concurrent)
//!                                          │
//!                      [assemble 3×3 mosaic if ×9]
//!                                          │
//!                      nearest-neighbour downsample ──► PixelMatrix
//! ```

pub mod downsample;
pub mod fetch;
pub mod mosaic;
pub mod pipeline;
pub mod raster;

pub use downsample::downsample;
pub use fetch::{ExportClient, ExportConfig, TileFetcher, ARCGIS_WORLD_IMAGERY_EXPORT_URL};
pub use mosaic::{assemble, TileGridPosition, GRID_TILES};
pub use pipeline::{plan_tiles, Mode, PipelineConfig, PixelPipeline};
pub use raster::{PixelMatrix, RasterImage, Rgb};
