//! Common test fixtures for terrain pixel tests.

use std::io::Write;

use tempfile::NamedTempFile;

/// Named `(latitude, longitude)` pairs.
pub mod places {
    /// The canonical end-to-end test location.
    pub const SAN_FRANCISCO: (f64, f64) = (37.7749, -122.4194);

    /// High latitude, where longitude spans stretch.
    pub const REYKJAVIK: (f64, f64) = (64.1466, -21.9426);

    /// Southern and eastern hemisphere.
    pub const SYDNEY: (f64, f64) = (-33.8688, 151.2093);

    /// Equator on the prime meridian.
    pub const NULL_ISLAND: (f64, f64) = (0.0, 0.0);
}

/// One distinct colour per 3×3 grid cell, indexed `dy_index * 3 + dx_index`
/// where index 0 is `dy = -1, dx = -1` (south-west).
pub const GRID_COLORS: [[u8; 3]; 9] = [
    [255, 0, 0],     // dy=-1, dx=-1
    [0, 255, 0],     // dy=-1, dx= 0
    [0, 0, 255],     // dy=-1, dx=+1
    [255, 255, 0],   // dy= 0, dx=-1
    [0, 255, 255],   // dy= 0, dx= 0
    [255, 0, 255],   // dy= 0, dx=+1
    [128, 64, 0],    // dy=+1, dx=-1
    [64, 0, 128],    // dy=+1, dx= 0
    [0, 128, 64],    // dy=+1, dx=+1
];

/// Writes `contents` to a temporary `.yaml` file that lives as long as the
/// returned handle.
pub fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".yaml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}
