//! Common types and utilities shared across the terrain pixel services.

pub mod bbox;
pub mod coord;
pub mod error;
pub mod geodesy;

pub use bbox::BoundingBox;
pub use coord::Coordinate;
pub use error::{PixelError, PixelResult};
pub use geodesy::{compute_bbox, destination, METERS_PER_DEGREE};
