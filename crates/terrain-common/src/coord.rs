//! Geographic point type.

use serde::{Deserialize, Serialize};

use crate::error::PixelError;

/// Valid latitude range in degrees.
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range in degrees.
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate without range checks.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, rejecting values outside the WGS84 ranges.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, PixelError> {
        if !latitude.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(PixelError::validation(format!(
                "latitude {} outside [{}, {}]",
                latitude, MIN_LAT, MAX_LAT
            )));
        }
        if !longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(PixelError::validation(format!(
                "longitude {} outside [{}, {}]",
                longitude, MIN_LON, MAX_LON
            )));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Returns a coordinate moved by whole multiples of `step` degrees.
    ///
    /// Used for 3×3 grid cells: no range check, the box calculation
    /// rejects shifted points that land on or past a pole.
    pub fn shifted(&self, dy: i32, dx: i32, step: f64) -> Self {
        Self::new(
            self.latitude + dy as f64 * step,
            self.longitude + dx as f64 * step,
        )
    }

    /// True when the latitude sits exactly on a pole.
    pub fn is_pole(&self) -> bool {
        self.latitude.abs() >= MAX_LAT
    }
}
