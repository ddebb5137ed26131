//! Imagery export client.
//!
//! Retrieves one rendered raster per bounding box from an ArcGIS
//! `MapServer/export` endpoint. Every call is one outbound GET; nothing is
//! cached and nothing is retried here.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use metrics::{counter, histogram};
use reqwest::{Client, StatusCode};
use terrain_common::{BoundingBox, PixelError, PixelResult};
use tracing::{debug, instrument, warn};

use crate::raster::RasterImage;

/// Esri World Imagery export endpoint.
pub const ARCGIS_WORLD_IMAGERY_EXPORT_URL: &str =
    "https://services.arcgisonline.com/arcgis/rest/services/World_Imagery/MapServer/export";

/// Provider error bodies are cut to this many characters.
const MAX_PROVIDER_MESSAGE_CHARS: usize = 512;

/// Source of raster tiles for a bounding box.
///
/// Implementations must be `Send + Sync` so one instance can serve
/// concurrent requests.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    /// Fetch and decode a `pixel_size × pixel_size` raster covering `bbox`.
    ///
    /// # Errors
    /// - `Fetch` for a non-success HTTP status
    /// - `Transport` for connection, timeout or body-read failures
    /// - `Decode` when the payload is not a decodable image
    async fn fetch_tile(&self, bbox: BoundingBox, pixel_size: u32) -> PixelResult<RasterImage>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}

/// Configuration for the export client.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Full URL of the `export` operation, without query string.
    pub export_url: String,
    /// Per-request timeout, covering connect through body read.
    pub fetch_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            export_url: ARCGIS_WORLD_IMAGERY_EXPORT_URL.to_string(),
            fetch_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// HTTP client for a MapServer export endpoint.
pub struct ExportClient {
    client: Client,
    export_url: String,
}

impl ExportClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &ExportConfig) -> PixelResult<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(16)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| PixelError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, &config.export_url))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client, export_url: &str) -> Self {
        Self {
            client,
            export_url: export_url.trim_end_matches('?').to_string(),
        }
    }

    /// Builds the export URL for a bounding box in EPSG:4326.
    pub fn build_url(&self, bbox: &BoundingBox, pixel_size: u32) -> String {
        format!(
            "{}?bbox={}&bboxSR=4326&size={},{}&imageSR=4326&format=png32&f=image",
            self.export_url,
            bbox.to_query_string(),
            pixel_size,
            pixel_size
        )
    }

    async fn download(&self, url: &str) -> PixelResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PixelError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PixelError::Fetch {
                status: status.as_u16(),
                provider_message: provider_message(status, &body),
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| PixelError::Transport(format!("Failed to read response: {}", e)))
    }
}

#[async_trait]
impl TileFetcher for ExportClient {
    #[instrument(skip(self, bbox), fields(bbox = %bbox.to_query_string(), size = pixel_size))]
    async fn fetch_tile(&self, bbox: BoundingBox, pixel_size: u32) -> PixelResult<RasterImage> {
        let url = self.build_url(&bbox, pixel_size);
        let start = Instant::now();

        counter!("imagery_tile_fetches_total").increment(1);
        let body = match self.download(&url).await {
            Ok(body) => body,
            Err(e) => {
                counter!("imagery_tile_fetch_errors_total", "kind" => e.kind()).increment(1);
                warn!(error = %e, "Tile fetch failed");
                return Err(e);
            }
        };
        histogram!("imagery_tile_fetch_duration_ms").record(start.elapsed().as_secs_f64() * 1000.0);

        let bytes = body.len();
        // PNG decode is CPU-bound; keep it off the async workers.
        let image = tokio::task::spawn_blocking(move || RasterImage::decode(&body))
            .await
            .map_err(|e| PixelError::Decode(format!("decode task failed: {}", e)))??;

        debug!(
            bytes,
            width = image.width(),
            height = image.height(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched tile"
        );
        Ok(image)
    }

    fn name(&self) -> &str {
        "ArcGIS export"
    }
}

/// Human-readable provider message from an error response.
fn provider_message(status: StatusCode, body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string();
    }
    trimmed.chars().take(MAX_PROVIDER_MESSAGE_CHARS).collect()
}
