//! Service configuration loading and types.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use imagery::{ExportConfig, PipelineConfig, ARCGIS_WORLD_IMAGERY_EXPORT_URL};
use serde::{Deserialize, Serialize};

/// Service configuration, loaded from an optional YAML file.
///
/// Every field has a default, so an empty file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Imagery provider settings.
    pub provider: ProviderConfig,

    /// Tile and output sizes.
    pub pipeline: PipelineSettings,

    /// Deadline for a whole request, fetches included.
    pub request_timeout_secs: u64,

    /// Offsets used by each endpoint.
    pub presets: Presets,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            pipeline: PipelineSettings::default(),
            request_timeout_secs: 60,
            presets: Presets::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// MapServer `export` URL.
    pub export_url: String,
    pub fetch_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            export_url: ARCGIS_WORLD_IMAGERY_EXPORT_URL.to_string(),
            fetch_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Pixel size requested per tile.
    pub tile_size: u32,
    /// Side length of the returned pixel grid.
    pub output_resolution: u32,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        let defaults = PipelineConfig::default();
        Self {
            tile_size: defaults.tile_size,
            output_resolution: defaults.output_resolution,
        }
    }
}

/// Degree-scale offsets for the fixed endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Presets {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub extra_tiles: f64,
}

impl Default for Presets {
    fn default() -> Self {
        Self {
            high: 0.02,
            medium: 0.08,
            low: 0.2,
            extra_tiles: 0.0035,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config: {:?}", path))?;
                Self::from_yaml(&content)
                    .with_context(|| format!("Failed to parse config: {:?}", path))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text. An empty document yields defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.provider.export_url.trim().is_empty() {
            bail!("provider.export_url must not be empty");
        }
        if self.provider.fetch_timeout_secs == 0 || self.provider.connect_timeout_secs == 0 {
            bail!("provider timeouts must be positive");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be positive");
        }
        if self.pipeline.tile_size == 0 || self.pipeline.output_resolution == 0 {
            bail!("pipeline.tile_size and pipeline.output_resolution must be positive");
        }

        let presets = [
            ("high", self.presets.high),
            ("medium", self.presets.medium),
            ("low", self.presets.low),
            ("extra_tiles", self.presets.extra_tiles),
        ];
        for (name, offset) in presets {
            if !offset.is_finite() || offset <= 0.0 {
                bail!("presets.{} must be a positive number, got {}", name, offset);
            }
        }
        Ok(())
    }

    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            export_url: self.provider.export_url.clone(),
            fetch_timeout: Duration::from_secs(self.provider.fetch_timeout_secs),
            connect_timeout: Duration::from_secs(self.provider.connect_timeout_secs),
        }
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            tile_size: self.pipeline.tile_size,
            output_resolution: self.pipeline.output_resolution,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
