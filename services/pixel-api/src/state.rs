//! Application state for the pixel API.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use imagery::{ExportClient, PixelPipeline, TileFetcher};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::{Presets, ServiceConfig};

/// Shared application state, built once at startup.
pub struct AppState {
    /// Point-to-pixels pipeline.
    pub pipeline: PixelPipeline,

    /// Offsets for the fixed endpoints.
    pub presets: Presets,

    /// Deadline for one request.
    pub request_timeout: Duration,

    /// Prometheus exporter, absent when no recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state backed by the configured imagery provider.
    pub fn new(config: &ServiceConfig, prometheus: Option<PrometheusHandle>) -> Result<Self> {
        let client = ExportClient::new(&config.export_config())?;
        Ok(Self::with_fetcher(config, Arc::new(client), prometheus))
    }

    /// Create state around any tile source.
    pub fn with_fetcher(
        config: &ServiceConfig,
        fetcher: Arc<dyn TileFetcher>,
        prometheus: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            pipeline: PixelPipeline::new(fetcher, config.pipeline_config()),
            presets: config.presets.clone(),
            request_timeout: config.request_timeout(),
            prometheus,
        }
    }
}
