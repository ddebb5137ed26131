//! Geodesic bounding boxes on the WGS84 ellipsoid.
//!
//! A request offset is a degree-scale linear distance. It is converted to
//! meters with a fixed 111 320 m per degree and the box corners are the
//! geodesic destinations reached by travelling that distance southwest
//! (bearing 225°) and northeast (bearing 45°) from the center. Because the
//! destinations are solved on the ellipsoid, the longitude span of the box
//! widens with latitude while its ground size stays constant.
//!
//! Implemented from scratch with Vincenty's direct formula.

use std::f64::consts::PI;

use crate::bbox::BoundingBox;
use crate::coord::{Coordinate, MAX_LAT};
use crate::error::{PixelError, PixelResult};

/// Approximate length of one degree of latitude in meters.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// WGS84 semi-major axis (meters).
const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Bearing of the southwest corner, degrees clockwise from north.
const BEARING_SW: f64 = 225.0;

/// Bearing of the northeast corner, degrees clockwise from north.
const BEARING_NE: f64 = 45.0;

const CONVERGENCE_EPSILON: f64 = 1e-12;
const MAX_ITERATIONS: usize = 200;

/// Solve the direct geodesic problem.
///
/// Returns the `(latitude, longitude)` in degrees reached by travelling
/// `distance_m` meters from `start` along the initial `bearing_deg`.
/// Longitude is not wrapped into [-180, 180].
pub fn destination(start: Coordinate, bearing_deg: f64, distance_m: f64) -> (f64, f64) {
    let a = WGS84_A;
    let f = WGS84_F;
    let b = a * (1.0 - f);

    let phi1 = start.latitude.to_radians();
    let alpha1 = bearing_deg.to_radians();
    let (sin_alpha1, cos_alpha1) = alpha1.sin_cos();

    // Reduced latitude
    let tan_u1 = (1.0 - f) * phi1.tan();
    let cos_u1 = 1.0 / (1.0 + tan_u1 * tan_u1).sqrt();
    let sin_u1 = tan_u1 * cos_u1;

    let sigma1 = tan_u1.atan2(cos_alpha1);
    let sin_alpha = cos_u1 * sin_alpha1;
    let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
    let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
    let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
    let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));

    let sigma0 = distance_m / (b * big_a);
    let mut sigma = sigma0;
    let mut cos_2sigma_m;
    let mut sin_sigma;
    let mut cos_sigma;
    let mut iterations = 0;

    loop {
        cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
        sin_sigma = sigma.sin();
        cos_sigma = sigma.cos();
        let delta_sigma = big_b
            * sin_sigma
            * (cos_2sigma_m
                + big_b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                        - big_b / 6.0
                            * cos_2sigma_m
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
        let previous = sigma;
        sigma = sigma0 + delta_sigma;
        iterations += 1;
        if (sigma - previous).abs() < CONVERGENCE_EPSILON || iterations >= MAX_ITERATIONS {
            break;
        }
    }

    // Refresh trig terms for the converged sigma
    cos_2sigma_m = (2.0 * sigma1 + sigma).cos();
    sin_sigma = sigma.sin();
    cos_sigma = sigma.cos();

    let x = sin_u1 * sin_sigma - cos_u1 * cos_sigma * cos_alpha1;
    let phi2 = (sin_u1 * cos_sigma + cos_u1 * sin_sigma * cos_alpha1)
        .atan2((1.0 - f) * (sin_alpha * sin_alpha + x * x).sqrt());
    let lambda = (sin_sigma * sin_alpha1).atan2(cos_u1 * cos_sigma - sin_u1 * sin_sigma * cos_alpha1);
    let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
    let l = lambda
        - (1.0 - c)
            * f
            * sin_alpha
            * (sigma
                + c * sin_sigma
                    * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

    let lat2 = phi2 * 180.0 / PI;
    let lon2 = start.longitude + l * 180.0 / PI;
    (lat2, lon2)
}

/// Compute the bounding box around `center` for a degree-scale `offset`.
///
/// # Errors
/// - `Validation` when `offset` is not a finite positive number or the
///   center is not finite.
/// - `InvalidCoordinate` when the center lies on or beyond a pole, or the
///   resulting box would be degenerate.
pub fn compute_bbox(center: Coordinate, offset: f64) -> PixelResult<BoundingBox> {
    if !offset.is_finite() || offset <= 0.0 {
        return Err(PixelError::validation(format!(
            "offset must be a positive number, got {}",
            offset
        )));
    }
    if !center.latitude.is_finite() || !center.longitude.is_finite() {
        return Err(PixelError::validation("coordinates must be finite numbers"));
    }
    if center.latitude.abs() >= MAX_LAT {
        return Err(PixelError::invalid_coordinate(format!(
            "latitude {} is on or beyond a pole",
            center.latitude
        )));
    }

    let distance_m = offset * METERS_PER_DEGREE;
    let (south, west) = destination(center, BEARING_SW, distance_m);
    let (north, east) = destination(center, BEARING_NE, distance_m);

    BoundingBox::try_new(west, south, east, north)
}
