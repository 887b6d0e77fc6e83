//! Haversine great-circle distance.
//!
//! Ignores roads entirely; the dispatcher only ever compares straight-line legs.

use crate::model::Coordinates;
use crate::traits::DistanceProvider;

/// Equatorial earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Haversine distance provider, in meters.
#[derive(Debug, Clone)]
pub struct Haversine {
    pub radius_m: f64,
}

impl Default for Haversine {
    fn default() -> Self {
        Self {
            radius_m: EARTH_RADIUS_M,
        }
    }
}

impl Haversine {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m }
    }
}

/// Great-circle distance between two points in meters. NaN in, NaN out.
pub fn haversine_m(from: Coordinates, to: Coordinates) -> f64 {
    central_angle(from, to) * EARTH_RADIUS_M
}

fn central_angle(from: Coordinates, to: Coordinates) -> f64 {
    let lat1_rad = from.latitude.to_radians();
    let lat2_rad = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lng = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);

    // Rounding can push `a` a hair past 1 for antipodal points. `f64::min`
    // would also turn NaN into 1, so clamp by comparison.
    let s = a.sqrt();
    2.0 * (if s > 1.0 { 1.0 } else { s }).asin()
}

impl DistanceProvider for Haversine {
    fn distance(&self, from: Coordinates, to: Coordinates) -> f64 {
        central_angle(from, to) * self.radius_m
    }
}
