//! Error types for the terrain pixel pipeline.

use thiserror::Error;

/// Result type alias using PixelError.
pub type PixelResult<T> = Result<T, PixelError>;

/// Primary error type for pipeline operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PixelError {
    // === Input Errors ===
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    // === Upstream Errors ===
    #[error("Imagery provider returned HTTP {status}: {provider_message}")]
    Fetch {
        status: u16,
        provider_message: String,
    },

    #[error("Transport error talking to imagery provider: {0}")]
    Transport(String),

    #[error("Failed to decode imagery: {0}")]
    Decode(String),

    // === Assembly Errors ===
    #[error("Tile {index} is {width}x{height}, expected {expected}x{expected}")]
    TileSizeMismatch {
        index: usize,
        expected: u32,
        width: u32,
        height: u32,
    },

    // === Infrastructure Errors ===
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

impl PixelError {
    /// Stable label for logs, metrics and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            PixelError::Validation(_) => "validation_error",
            PixelError::InvalidCoordinate(_) => "invalid_coordinate",
            PixelError::Fetch { .. } => "fetch_error",
            PixelError::Transport(_) => "transport_error",
            PixelError::Decode(_) => "decode_error",
            PixelError::TileSizeMismatch { .. } => "tile_size_mismatch",
            PixelError::Timeout(_) => "timeout",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            PixelError::Validation(_) | PixelError::InvalidCoordinate(_) => 400,

            PixelError::Fetch { .. } | PixelError::Transport(_) | PixelError::Decode(_) => 502,

            PixelError::Timeout(_) => 504,

            PixelError::TileSizeMismatch { .. } => 500,
        }
    }

    /// True for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_coordinate(msg: impl Into<String>) -> Self {
        Self::InvalidCoordinate(msg.into())
    }
}

impl From<serde_json::Error> for PixelError {
    fn from(err: serde_json::Error) -> Self {
        PixelError::Validation(format!("JSON error: {}", err))
    }
}
