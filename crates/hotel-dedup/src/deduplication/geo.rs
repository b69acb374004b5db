//! Great-circle distance and distance scoring

use crate::domain::Coordinates;

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Below this distance two positions are treated as identical (GPS/rounding noise)
pub const NOISE_DISTANCE_M: f64 = 50.0;

/// Beyond this distance two positions score zero
pub const MAX_SCORED_DISTANCE_M: f64 = 2000.0;

/// Length of one degree of latitude on the haversine sphere
pub(crate) const METERS_PER_DEGREE_LAT: f64 = EARTH_RADIUS_KM * 1000.0 * std::f64::consts::PI / 180.0;

/// Haversine distance in kilometers
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    // Absolute deltas keep the result bit-identical when the points are swapped
    let dphi = (lat2 - lat1).abs().to_radians();
    let dlambda = (lon2 - lon1).abs().to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Haversine distance in meters between two positions
pub fn distance_m(a: &Coordinates, b: &Coordinates) -> f64 {
    haversine_km(a.latitude, a.longitude, b.latitude, b.longitude) * 1000.0
}

/// Map a distance to a score: 1.0 under 50 m, 0.0 over 2000 m, linear in between
pub fn distance_score(distance_m: f64) -> f64 {
    if distance_m < NOISE_DISTANCE_M {
        return 1.0;
    }
    if distance_m > MAX_SCORED_DISTANCE_M {
        return 0.0;
    }
    let span = MAX_SCORED_DISTANCE_M - NOISE_DISTANCE_M;
    (1.0 - (distance_m - NOISE_DISTANCE_M) / span).max(0.0)
}
