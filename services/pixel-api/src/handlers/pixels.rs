//! Pixel grid endpoints.
//!
//! Each endpoint is a fixed preset over the same pipeline:
//!
//! | Path | Mode | Preset |
//! |---|---|---|
//! | `/get_pixels_high` | single | `high` |
//! | `/get_pixels_med` | single | `medium` |
//! | `/get_pixels_low` | single | `low` |
//! | `/get_extra_tiles` | 3×3 grid | `extra_tiles` |

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Extension,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use imagery::{Mode, PixelMatrix};
use metrics::{counter, histogram};
use serde_json::Value;
use terrain_common::{Coordinate, PixelError, PixelResult};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// The four pixel endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    High,
    Medium,
    Low,
    ExtraTiles,
}

impl Endpoint {
    /// Label used in logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            Endpoint::High => "high",
            Endpoint::Medium => "medium",
            Endpoint::Low => "low",
            Endpoint::ExtraTiles => "extra_tiles",
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Endpoint::ExtraTiles => Mode::Grid3x3,
            _ => Mode::Single,
        }
    }

    fn preset(&self, state: &AppState) -> f64 {
        match self {
            Endpoint::High => state.presets.high,
            Endpoint::Medium => state.presets.medium,
            Endpoint::Low => state.presets.low,
            Endpoint::ExtraTiles => state.presets.extra_tiles,
        }
    }
}

/// A parsed request body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub offset: Option<f64>,
}

impl PixelRequest {
    /// Parse a JSON body of the form
    /// `{"latitude": .., "longitude": .., "offset"?: ..}`.
    ///
    /// Numbers may also be sent as numeric strings. Unknown fields are
    /// ignored; a `null` offset counts as absent.
    pub fn from_body(body: &[u8]) -> PixelResult<Self> {
        let value: Value = serde_json::from_slice(body)?;
        let object = value
            .as_object()
            .ok_or_else(|| PixelError::validation("request body must be a JSON object"))?;

        let latitude = required_number(object.get("latitude"), "latitude")?;
        let longitude = required_number(object.get("longitude"), "longitude")?;
        let offset = match object.get("offset") {
            None | Some(Value::Null) => None,
            Some(value) => Some(as_number(value, "offset")?),
        };

        Ok(Self {
            latitude,
            longitude,
            offset,
        })
    }
}

fn required_number(value: Option<&Value>, field: &str) -> PixelResult<f64> {
    match value {
        None | Some(Value::Null) => Err(PixelError::validation(format!(
            "missing field `{}`",
            field
        ))),
        Some(value) => as_number(value, field),
    }
}

fn as_number(value: &Value, field: &str) -> PixelResult<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(PixelError::validation(format!(
            "field `{}` must be a finite number, got {}",
            field, value
        ))),
    }
}

/// POST /get_pixels_high
pub async fn high_handler(Extension(state): Extension<Arc<AppState>>, body: Bytes) -> Response {
    serve(state, Endpoint::High, body).await
}

/// POST /get_pixels_med
pub async fn medium_handler(Extension(state): Extension<Arc<AppState>>, body: Bytes) -> Response {
    serve(state, Endpoint::Medium, body).await
}

/// POST /get_pixels_low
pub async fn low_handler(Extension(state): Extension<Arc<AppState>>, body: Bytes) -> Response {
    serve(state, Endpoint::Low, body).await
}

/// POST /get_extra_tiles
pub async fn extra_tiles_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Response {
    serve(state, Endpoint::ExtraTiles, body).await
}

async fn serve(state: Arc<AppState>, endpoint: Endpoint, body: Bytes) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();
    counter!("pixel_requests_total", "endpoint" => endpoint.name()).increment(1);

    let result = handle(&state, endpoint, &body, &request_id).await;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!("pixel_request_duration_ms", "endpoint" => endpoint.name()).record(elapsed_ms);

    match result {
        Ok(matrix) => {
            info!(
                request_id = %request_id,
                endpoint = endpoint.name(),
                pixels = matrix.len(),
                elapsed_ms = elapsed_ms as u64,
                "Pixel request completed"
            );
            Json(matrix).into_response()
        }
        Err(e) => {
            counter!(
                "pixel_request_errors_total",
                "endpoint" => endpoint.name(),
                "kind" => e.kind()
            )
            .increment(1);
            if e.is_client_error() {
                warn!(
                    request_id = %request_id,
                    endpoint = endpoint.name(),
                    kind = e.kind(),
                    error = %e,
                    "Rejected pixel request"
                );
            } else {
                error!(
                    request_id = %request_id,
                    endpoint = endpoint.name(),
                    kind = e.kind(),
                    error = %e,
                    "Pixel request failed"
                );
            }
            ApiError(e).into_response()
        }
    }
}

async fn handle(
    state: &AppState,
    endpoint: Endpoint,
    body: &[u8],
    request_id: &str,
) -> PixelResult<PixelMatrix> {
    let request = PixelRequest::from_body(body)?;
    let center = Coordinate::try_new(request.latitude, request.longitude)?;
    let offset = request.offset.unwrap_or_else(|| endpoint.preset(state));
    let mode = endpoint.mode();

    info!(
        request_id = %request_id,
        endpoint = endpoint.name(),
        latitude = center.latitude,
        longitude = center.longitude,
        offset,
        mode = %mode,
        "Received pixel request"
    );

    // Dropping the pipeline future on expiry cancels any in-flight fetches.
    match tokio::time::timeout(state.request_timeout, state.pipeline.run(center, offset, mode))
        .await
    {
        Ok(result) => result,
        Err(_) => Err(PixelError::Timeout(state.request_timeout.as_secs())),
    }
}
