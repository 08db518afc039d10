//! Distance and travel time matrices.
//!
//! Great-circle distances between stops, stored as a dense row-major
//! matrix, and the travel times derived from them at a given speed.

mod matrix;

pub use matrix::{DistanceMatrix, TimeMatrix};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers between two points given in degrees.
///
/// # Examples
///
/// ```
/// use u_lastmile::distance::haversine_km;
///
/// assert_eq!(haversine_km(10.0, 20.0, 10.0, 20.0), 0.0);
/// let d = haversine_km(0.0, 0.0, 0.0, 1.0);
/// assert!((d - 111.195).abs() < 1e-3);
/// ```
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}
