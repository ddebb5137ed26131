//! Request orchestration: boxes, fetch fan-out, mosaic, pixelation.

use std::sync::Arc;
use std::time::Instant;

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use terrain_common::{compute_bbox, BoundingBox, Coordinate, PixelError, PixelResult};
use tracing::{debug, info, instrument};

use crate::downsample::downsample;
use crate::fetch::TileFetcher;
use crate::mosaic::{assemble, TileGridPosition};
use crate::raster::PixelMatrix;

/// How many tiles a request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// One box around the centre.
    Single,
    /// Nine boxes on shifted centres, stitched into one mosaic.
    Grid3x3,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Single => "single",
            Mode::Grid3x3 => "grid3x3",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raster sizes used by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Pixel size requested from the provider for each tile.
    pub tile_size: u32,
    /// Side of the returned pixel matrix.
    pub output_resolution: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tile_size: 800,
            output_resolution: 400,
        }
    }
}

/// Compute the bounding box for every tile a request needs, in fetch order.
///
/// Grid cells use the centre shifted by `dy·offset` degrees of latitude and
/// `dx·offset` degrees of longitude, each with the same `offset`.
pub fn plan_tiles(
    center: Coordinate,
    offset: f64,
    mode: Mode,
) -> PixelResult<Vec<(TileGridPosition, BoundingBox)>> {
    match mode {
        Mode::Single => Ok(vec![(
            TileGridPosition::CENTER,
            compute_bbox(center, offset)?,
        )]),
        Mode::Grid3x3 => TileGridPosition::all()
            .into_iter()
            .map(|position| {
                let cell = center.shifted(position.dy, position.dx, offset);
                compute_bbox(cell, offset).map(|bbox| (position, bbox))
            })
            .collect(),
    }
}

/// Turns a point into a pixel matrix.
///
/// Holds no per-request state; one instance serves all requests.
#[derive(Clone)]
pub struct PixelPipeline {
    fetcher: Arc<dyn TileFetcher>,
    config: PipelineConfig,
}

impl PixelPipeline {
    pub fn new(fetcher: Arc<dyn TileFetcher>, config: PipelineConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate the centre and compute the tile boxes without fetching.
    pub fn plan(
        &self,
        center: Coordinate,
        offset: f64,
        mode: Mode,
    ) -> PixelResult<Vec<(TileGridPosition, BoundingBox)>> {
        let center = Coordinate::try_new(center.latitude, center.longitude)?;
        plan_tiles(center, offset, mode)
    }

    /// Run the full pipeline for one request.
    ///
    /// In `Grid3x3` mode the nine fetches run concurrently; the first
    /// failure is returned and the remaining fetches are dropped.
    #[instrument(skip(self, center), fields(
        latitude = center.latitude,
        longitude = center.longitude,
        fetcher = self.fetcher.name()
    ))]
    pub async fn run(
        &self,
        center: Coordinate,
        offset: f64,
        mode: Mode,
    ) -> PixelResult<PixelMatrix> {
        let start = Instant::now();
        let plan = self.plan(center, offset, mode)?;
        let tile_size = self.config.tile_size;

        debug!(tiles = plan.len(), tile_size, "Fetching tiles");

        let tiles = try_join_all(
            plan.iter()
                .map(|(_, bbox)| self.fetcher.fetch_tile(*bbox, tile_size)),
        )
        .await?;
        let fetched_ms = start.elapsed().as_millis() as u64;

        let image = match mode {
            Mode::Single => tiles
                .into_iter()
                .next()
                .ok_or_else(|| PixelError::validation("no tile planned for request"))?,
            Mode::Grid3x3 => assemble(tiles, tile_size)?,
        };

        let matrix = downsample(image, self.config.output_resolution)?;

        info!(
            fetched_ms,
            elapsed_ms = start.elapsed().as_millis() as u64,
            pixels = matrix.len(),
            "Pipeline complete"
        );
        Ok(matrix)
    }
}
