//! Deterministic synthetic delivery datasets.
//!
//! A depot near a city centre and customers spread uniformly over a box of
//! about 33 × 25 km, with small parcel demands, daytime delivery windows
//! and short service times.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, RoutingError};
use crate::models::{Stop, StopSet};

/// City centre latitude.
pub const CENTER_LAT: f64 = 42.36;
/// City centre longitude.
pub const CENTER_LON: f64 = -71.06;

const DEPOT_SPREAD: f64 = 0.02;
const CUSTOMER_SPREAD: f64 = 0.15;

const DEMANDS: [f64; 5] = [1.0, 2.0, 3.0, 4.0, 5.0];
const DEMAND_WEIGHTS: [f64; 5] = [0.4, 0.3, 0.15, 0.1, 0.05];

const WINDOW_HOURS: [u32; 5] = [2, 3, 4, 5, 6];
const WINDOW_WEIGHTS: [f64; 5] = [0.2, 0.3, 0.3, 0.15, 0.05];
const LATEST_HOUR: u32 = 20;

const SERVICE_MINUTES: [f64; 3] = [5.0, 10.0, 15.0];
const SERVICE_WEIGHTS: [f64; 3] = [0.3, 0.5, 0.2];

fn weighted(weights: &[f64]) -> Result<WeightedIndex<f64>> {
    WeightedIndex::new(weights).map_err(|e| RoutingError::InvalidConfig(format!("bad weights: {e}")))
}

/// Generates a depot plus `n_customers` stops, identical for equal seeds.
///
/// Customers get ids `CUST_001`, `CUST_002`, …; the depot is `DEPOT`.
///
/// # Errors
///
/// [`RoutingError::NotEnoughCustomers`] if `n_customers < 2`.
///
/// # Examples
///
/// ```
/// use u_lastmile::demo_data::generate;
///
/// let stops = generate(40, 42).unwrap();
/// assert_eq!(stops.num_customers(), 40);
/// assert_eq!(stops.get(stops.depot()).id(), "DEPOT");
/// assert!(stops.has_time_windows());
/// ```
pub fn generate(n_customers: usize, seed: u64) -> Result<StopSet> {
    let mut rng = StdRng::seed_from_u64(seed);
    let demand = weighted(&DEMAND_WEIGHTS)?;
    let window = weighted(&WINDOW_WEIGHTS)?;
    let service = weighted(&SERVICE_WEIGHTS)?;

    let mut stops = Vec::with_capacity(n_customers + 1);
    stops.push(Stop::depot(
        "DEPOT",
        CENTER_LAT + rng.random_range(-DEPOT_SPREAD..DEPOT_SPREAD),
        CENTER_LON + rng.random_range(-DEPOT_SPREAD..DEPOT_SPREAD),
    ));

    for i in 0..n_customers {
        let lat = CENTER_LAT + rng.random_range(-CUSTOMER_SPREAD..CUSTOMER_SPREAD);
        let lon = CENTER_LON + rng.random_range(-CUSTOMER_SPREAD..CUSTOMER_SPREAD);
        let start_hour: u32 = rng.random_range(9..=14);
        let end_hour = (start_hour + WINDOW_HOURS[window.sample(&mut rng)]).min(LATEST_HOUR);
        stops.push(
            Stop::new(format!("CUST_{:03}", i + 1), lat, lon)
                .with_demand(DEMANDS[demand.sample(&mut rng)])
                .with_time_window(
                    Some(f64::from(start_hour * 60)),
                    Some(f64::from(end_hour * 60)),
                )
                .with_service_minutes(SERVICE_MINUTES[service.sample(&mut rng)]),
        );
    }

    StopSet::new(stops)
}
