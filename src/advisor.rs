//! Auto-configuration from dataset statistics.
//!
//! Suggests a [`FleetConfig`] for a stop table without running any search:
//! about one vehicle per 25 stops, capacity sized from the demand
//! distribution, and a longer working day when time windows are present.

use serde::{Deserialize, Serialize};

use crate::models::{DepotWindow, FleetConfig, StopSet};

/// Stops a vehicle is expected to serve.
pub const STOPS_PER_VEHICLE: usize = 25;

/// Upper bound on the suggested fleet.
pub const MAX_VEHICLES: usize = 50;

/// Default urban travel speed.
pub const DEFAULT_SPEED_KMH: f64 = 45.0;

/// Dataset statistics the advisor works from.
///
/// `has_demand` and `has_time_windows` say whether the caller mapped those
/// optional attributes; unmapped demand is ignored even if present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatasetProfile {
    /// Rows in the stop table, depot included.
    pub num_stops: usize,
    /// Sum of demand over all stops.
    pub total_demand: f64,
    /// Largest single-stop demand.
    pub max_demand: f64,
    /// Whether demand data is available.
    pub has_demand: bool,
    /// Whether any stop declares a time window bound.
    pub has_time_windows: bool,
}

impl DatasetProfile {
    /// Profiles a validated stop set, treating both optional attributes as mapped.
    pub fn from_stops(stops: &StopSet) -> Self {
        Self {
            num_stops: stops.len(),
            total_demand: stops.total_demand(),
            max_demand: stops.max_demand(),
            has_demand: true,
            has_time_windows: stops.has_time_windows(),
        }
    }
}

/// A suggested configuration and the constraint families it enables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Suggested parameters. `capacity` is `None` when capacity is unused.
    pub config: FleetConfig,
    /// Whether capacity constraints should be applied.
    pub use_capacity: bool,
    /// Whether time window constraints should be applied.
    pub use_time_windows: bool,
}

/// Suggests fleet parameters for a dataset.
///
/// # Examples
///
/// ```
/// use u_lastmile::advisor::{suggest, DatasetProfile};
///
/// let profile = DatasetProfile {
///     num_stops: 60,
///     total_demand: 120.0,
///     max_demand: 5.0,
///     has_demand: true,
///     has_time_windows: false,
/// };
/// let s = suggest(&profile);
/// assert_eq!(s.config.num_vehicles, 3);
/// assert_eq!(s.config.capacity, Some(60.0));
/// assert_eq!(s.config.max_route_duration_hours, Some(9.0));
/// assert!(s.use_capacity);
/// ```
pub fn suggest(profile: &DatasetProfile) -> Suggestion {
    let num_vehicles = profile
        .num_stops
        .div_ceil(STOPS_PER_VEHICLE)
        .clamp(1, MAX_VEHICLES);

    let use_capacity = profile.has_demand && profile.total_demand > 0.0;
    let capacity = use_capacity.then(|| {
        let average = profile.total_demand / profile.num_stops.max(1) as f64;
        (profile.max_demand * 1.5).max(average * 30.0)
    });

    let tw = profile.has_time_windows;
    let config = FleetConfig {
        num_vehicles,
        capacity,
        max_route_duration_hours: Some(if tw { 10.0 } else { 9.0 }),
        depot_window: DepotWindow::from_hours(8, if tw { 20 } else { 18 }),
        speed_kmh: DEFAULT_SPEED_KMH,
        enforce_time_windows: tw,
        ..FleetConfig::default()
    };

    Suggestion {
        config,
        use_capacity,
        use_time_windows: tw,
    }
}

/// Shorthand for [`suggest`] over [`DatasetProfile::from_stops`].
pub fn suggest_for(stops: &StopSet) -> Suggestion {
    suggest(&DatasetProfile::from_stops(stops))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stop;

    fn profile(num_stops: usize) -> DatasetProfile {
        DatasetProfile {
            num_stops,
            total_demand: 0.0,
            max_demand: 0.0,
            has_demand: false,
            has_time_windows: false,
        }
    }

    #[test]
    fn test_vehicle_count_bounds() {
        assert_eq!(suggest(&profile(3)).config.num_vehicles, 1);
        assert_eq!(suggest(&profile(25)).config.num_vehicles, 1);
        assert_eq!(suggest(&profile(26)).config.num_vehicles, 2);
        assert_eq!(suggest(&profile(5_000)).config.num_vehicles, MAX_VEHICLES);
    }

    #[test]
    fn test_no_demand_disables_capacity() {
        let s = suggest(&profile(40));
        assert!(!s.use_capacity);
        assert!(s.config.capacity.is_none());

        let unmapped = DatasetProfile {
            total_demand: 50.0,
            max_demand: 4.0,
            ..profile(40)
        };
        assert!(!suggest(&unmapped).use_capacity);
    }

    #[test]
    fn test_capacity_from_max_demand() {
        // Average 0.1 per stop: 1.5 × max dominates.
        let p = DatasetProfile {
            total_demand: 10.0,
            max_demand: 8.0,
            has_demand: true,
            ..profile(100)
        };
        assert_eq!(suggest(&p).config.capacity, Some(12.0));
    }

    #[test]
    fn test_time_windows_extend_day() {
        let p = DatasetProfile {
            has_time_windows: true,
            ..profile(10)
        };
        let s = suggest(&p);
        assert!(s.use_time_windows);
        assert!(s.config.enforce_time_windows);
        assert_eq!(s.config.max_route_duration_hours, Some(10.0));
        assert_eq!(s.config.depot_window, DepotWindow::from_hours(8, 20));

        let s = suggest(&profile(10));
        assert!(!s.config.enforce_time_windows);
        assert_eq!(s.config.depot_window, DepotWindow::from_hours(8, 18));
        assert_eq!(s.config.speed_kmh, 45.0);
    }

    #[test]
    fn test_suggest_for_stop_set() {
        let stops = StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 0.1).with_demand(2.0),
            Stop::new("B", 0.0, 0.2).with_demand(4.0).with_time_window(Some(600.0), None),
        ])
        .expect("valid");
        let s = suggest_for(&stops);
        assert_eq!(s.config.num_vehicles, 1);
        // max(4 × 1.5, 6 / 3 × 30)
        assert_eq!(s.config.capacity, Some(60.0));
        assert!(s.use_time_windows);
        assert!(s.config.validate().is_ok());
    }
}
