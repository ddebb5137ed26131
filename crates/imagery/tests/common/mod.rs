//! Common test utilities for imagery tests
//!
//! Provides:
//! - `ScriptedFetcher`, a `TileFetcher` that answers from a table keyed by bbox
//! - Helpers to script one colour per 3×3 grid cell
//! - A local axum server for exercising the real export client

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use imagery::{plan_tiles, Mode, RasterImage, TileFetcher};
use terrain_common::{BoundingBox, Coordinate, PixelError, PixelResult};
use test_utils::{solid_tile, GRID_COLORS};

/// What the scripted fetcher returns for one box.
#[derive(Debug, Clone)]
pub enum Reply {
    /// A tile of the requested size in one colour.
    Solid([u8; 3]),
    /// A tile of a fixed size, ignoring the requested size.
    Sized(u32, [u8; 3]),
    /// Fail with this error.
    Fail(PixelError),
    /// Sleep for the duration, then answer with a solid tile.
    Slow(Duration, [u8; 3]),
}

/// A `TileFetcher` that never touches the network.
pub struct ScriptedFetcher {
    replies: HashMap<String, Reply>,
    fallback: Reply,
    calls: Mutex<Vec<(BoundingBox, u32)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Option<Duration>,
}

impl ScriptedFetcher {
    pub fn new(fallback: Reply) -> Self {
        Self {
            replies: HashMap::new(),
            fallback,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: None,
        }
    }

    /// Every box gets a tile of one colour.
    pub fn solid(color: [u8; 3]) -> Self {
        Self::new(Reply::Solid(color))
    }

    /// Each of the nine grid boxes around `center` gets `GRID_COLORS[index]`.
    pub fn grid_colors(center: Coordinate, offset: f64) -> Self {
        let mut fetcher = Self::solid([0, 0, 0]);
        for (position, bbox) in plan_tiles(center, offset, Mode::Grid3x3).unwrap() {
            fetcher = fetcher.reply(&bbox, Reply::Solid(GRID_COLORS[position.index()]));
        }
        fetcher
    }

    pub fn reply(mut self, bbox: &BoundingBox, reply: Reply) -> Self {
        self.replies.insert(bbox.to_query_string(), reply);
        self
    }

    /// Every call waits this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(BoundingBox, u32)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TileFetcher for ScriptedFetcher {
    async fn fetch_tile(&self, bbox: BoundingBox, pixel_size: u32) -> PixelResult<RasterImage> {
        self.calls.lock().unwrap().push((bbox, pixel_size));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self
            .replies
            .get(&bbox.to_query_string())
            .unwrap_or(&self.fallback)
            .clone();
        let result = match reply {
            Reply::Solid(color) => Ok(RasterImage::new(solid_tile(pixel_size, color))),
            Reply::Sized(size, color) => Ok(RasterImage::new(solid_tile(size, color))),
            Reply::Fail(err) => Err(err),
            Reply::Slow(delay, color) => {
                tokio::time::sleep(delay).await;
                Ok(RasterImage::new(solid_tile(pixel_size, color)))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Serve `router` on an ephemeral local port and return its address.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
