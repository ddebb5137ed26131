//! Pixel API Service Library
//!
//! HTTP surface over the imagery pipeline: four POST endpoints that turn a
//! latitude/longitude into a flat array of RGB triples, plus health and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pixel endpoints
        .route("/get_pixels_high", post(handlers::pixels::high_handler))
        .route("/get_pixels_med", post(handlers::pixels::medium_handler))
        .route("/get_pixels_low", post(handlers::pixels::low_handler))
        .route("/get_extra_tiles", post(handlers::pixels::extra_tiles_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
