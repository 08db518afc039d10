//! Route type.

use serde::{Deserialize, Serialize};

/// An ordered depot-to-depot path served by one vehicle, with its totals.
///
/// `stops` holds stop positions and starts and ends with the depot position.
/// Distances are kilometers, times minutes (travel plus service, without
/// waiting).
///
/// # Examples
///
/// ```
/// use u_lastmile::models::Route;
///
/// let route = Route::new(0, vec![0, 2, 1, 0], 12.5, 30.0, 4.0);
/// assert_eq!(route.num_stops(), 2);
/// assert_eq!(route.customers(), &[2, 1]);
/// assert!(route.is_used());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    vehicle_id: usize,
    stops: Vec<usize>,
    distance: f64,
    time: f64,
    demand: f64,
}

impl Route {
    /// Creates a route from its stop sequence and totals.
    pub fn new(vehicle_id: usize, stops: Vec<usize>, distance: f64, time: f64, demand: f64) -> Self {
        Self {
            vehicle_id,
            stops,
            distance,
            time,
            demand,
        }
    }

    /// Vehicle serving this route.
    pub fn vehicle_id(&self) -> usize {
        self.vehicle_id
    }

    /// Full stop sequence including the depot at both ends.
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Customer stops only, in visit order.
    pub fn customers(&self) -> &[usize] {
        if self.stops.len() < 2 {
            return &[];
        }
        &self.stops[1..self.stops.len() - 1]
    }

    /// Number of customer stops.
    pub fn num_stops(&self) -> usize {
        self.customers().len()
    }

    /// Returns `true` if the route visits at least one customer.
    pub fn is_used(&self) -> bool {
        self.stops.len() > 2
    }

    /// Total distance in kilometers.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Total travel plus service time in minutes.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Total demand delivered.
    pub fn demand(&self) -> f64 {
        self.demand
    }
}
