//! Common test utilities for pixel-api tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use imagery::{plan_tiles, Mode, RasterImage, TileFetcher};
use pixel_api::build_router;
use pixel_api::config::ServiceConfig;
use pixel_api::state::AppState;
use terrain_common::{BoundingBox, Coordinate, PixelError, PixelResult};
use test_utils::{solid_tile, GRID_COLORS};
use tower::ServiceExt;

/// Answers every box with a solid tile unless a failure or colour is scripted.
pub struct StubFetcher {
    color: [u8; 3],
    colors: HashMap<String, [u8; 3]>,
    failure: Option<PixelError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubFetcher {
    pub fn solid(color: [u8; 3]) -> Self {
        Self {
            color,
            colors: HashMap::new(),
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(err: PixelError) -> Self {
        Self {
            failure: Some(err),
            ..Self::solid([0, 0, 0])
        }
    }

    /// One `GRID_COLORS` entry per 3×3 cell around `center`.
    pub fn grid(center: Coordinate, offset: f64) -> Self {
        let mut fetcher = Self::solid([0, 0, 0]);
        for (position, bbox) in plan_tiles(center, offset, Mode::Grid3x3).unwrap() {
            fetcher
                .colors
                .insert(bbox.to_query_string(), GRID_COLORS[position.index()]);
        }
        fetcher
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileFetcher for StubFetcher {
    async fn fetch_tile(&self, bbox: BoundingBox, pixel_size: u32) -> PixelResult<RasterImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        let color = self
            .colors
            .get(&bbox.to_query_string())
            .copied()
            .unwrap_or(self.color);
        Ok(RasterImage::new(solid_tile(pixel_size, color)))
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Config with small rasters so grid tests stay fast.
pub fn small_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.pipeline.tile_size = 30;
    config.pipeline.output_resolution = 9;
    config
}

pub fn app(config: &ServiceConfig, fetcher: Arc<StubFetcher>) -> Router {
    build_router(Arc::new(AppState::with_fetcher(config, fetcher, None)))
}

/// POST a raw body and return the status and parsed JSON response.
pub async fn post_json(app: Router, path: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// GET a path and return the status and body text.
pub async fn get_text(app: Router, path: &str) -> (StatusCode, String) {
    let request = Request::builder().uri(path).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
