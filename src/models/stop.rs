//! Stop, time window, and validated stop table types.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

/// A delivery time window in minutes from midnight.
///
/// Either bound may be absent. A vehicle arriving before `earliest` waits;
/// arriving after `latest` violates the window.
///
/// # Examples
///
/// ```
/// use u_lastmile::models::TimeWindow;
///
/// let tw = TimeWindow::new(Some(540.0), Some(720.0)).unwrap();
/// assert!(tw.contains(600.0));
/// assert!(!tw.contains(730.0));
/// assert_eq!(tw.waiting_time(500.0), 40.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest: Option<f64>,
    latest: Option<f64>,
}

impl TimeWindow {
    /// Creates a time window.
    ///
    /// Returns `None` if a bound is non-finite or `earliest > latest`.
    pub fn new(earliest: Option<f64>, latest: Option<f64>) -> Option<Self> {
        if earliest.is_some_and(|e| !e.is_finite()) || latest.is_some_and(|l| !l.is_finite()) {
            return None;
        }
        if let (Some(e), Some(l)) = (earliest, latest) {
            if e > l {
                return None;
            }
        }
        Some(Self { earliest, latest })
    }

    /// A window with no bounds.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Earliest allowed service start, if bounded.
    pub fn earliest(&self) -> Option<f64> {
        self.earliest
    }

    /// Latest allowed service start, if bounded.
    pub fn latest(&self) -> Option<f64> {
        self.latest
    }

    /// Returns `true` if neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.earliest.is_none() && self.latest.is_none()
    }

    /// Returns `true` if `time` satisfies both bounds (inclusive).
    pub fn contains(&self, time: f64) -> bool {
        self.earliest.is_none_or(|e| time >= e) && self.latest.is_none_or(|l| time <= l)
    }

    /// Minutes spent waiting when arriving at `arrival`.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        match self.earliest {
            Some(e) if arrival < e => e - arrival,
            _ => 0.0,
        }
    }

    /// Returns `true` if arriving at `arrival` is too late.
    pub fn is_violated(&self, arrival: f64) -> bool {
        self.latest.is_some_and(|l| arrival > l)
    }
}

/// A location to be visited, or the depot.
///
/// # Examples
///
/// ```
/// use u_lastmile::models::Stop;
///
/// let depot = Stop::depot("DEPOT", 42.36, -71.06);
/// assert!(depot.is_depot());
///
/// let stop = Stop::new("C1", 42.40, -71.10)
///     .with_demand(3.0)
///     .with_service_minutes(10.0)
///     .with_time_window(Some(540.0), Some(720.0));
/// assert_eq!(stop.demand(), 3.0);
/// assert_eq!(stop.time_window().latest(), Some(720.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    id: String,
    lat: f64,
    lon: f64,
    #[serde(default)]
    demand: f64,
    #[serde(default)]
    time_window: TimeWindow,
    #[serde(default)]
    service_minutes: f64,
    #[serde(default)]
    is_depot: bool,
}

impl Stop {
    /// Creates a customer stop with zero demand, no time window and no service time.
    pub fn new(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lon,
            demand: 0.0,
            time_window: TimeWindow::unbounded(),
            service_minutes: 0.0,
            is_depot: false,
        }
    }

    /// Creates the depot stop.
    pub fn depot(id: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            is_depot: true,
            ..Self::new(id, lat, lon)
        }
    }

    /// Sets the demand.
    pub fn with_demand(mut self, demand: f64) -> Self {
        self.demand = demand;
        self
    }

    /// Sets the service duration in minutes.
    pub fn with_service_minutes(mut self, minutes: f64) -> Self {
        self.service_minutes = minutes;
        self
    }

    /// Sets the time window bounds (minutes from midnight).
    ///
    /// Bounds are stored as given; [`StopSet::new`] rejects inverted windows.
    pub fn with_time_window(mut self, earliest: Option<f64>, latest: Option<f64>) -> Self {
        self.time_window = TimeWindow { earliest, latest };
        self
    }

    /// Sets or clears the depot flag.
    pub fn with_depot_flag(mut self, is_depot: bool) -> Self {
        self.is_depot = is_depot;
        self
    }

    /// Unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Demand to deliver.
    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Delivery time window.
    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    /// Service duration in minutes.
    pub fn service_minutes(&self) -> f64 {
        self.service_minutes
    }

    /// Whether this stop is the depot.
    pub fn is_depot(&self) -> bool {
        self.is_depot
    }

    fn validate(&self) -> Result<()> {
        let coords_ok = self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0;
        if !coords_ok {
            return Err(RoutingError::InvalidCoordinates {
                id: self.id.clone(),
                lat: self.lat,
                lon: self.lon,
            });
        }
        for (field, value) in [("demand", self.demand), ("service time", self.service_minutes)] {
            if !value.is_finite() || value < 0.0 {
                return Err(RoutingError::InvalidStopAttribute {
                    id: self.id.clone(),
                    field,
                    value,
                });
            }
        }
        let TimeWindow { earliest, latest } = self.time_window;
        for value in [earliest, latest].into_iter().flatten() {
            if !value.is_finite() {
                return Err(RoutingError::InvalidStopAttribute {
                    id: self.id.clone(),
                    field: "time window bound",
                    value,
                });
            }
        }
        if let (Some(e), Some(l)) = (earliest, latest) {
            if e > l {
                return Err(RoutingError::InvertedTimeWindow {
                    id: self.id.clone(),
                    earliest: e,
                    latest: l,
                });
            }
        }
        Ok(())
    }
}

/// A validated, immutable stop table.
///
/// Invariants: ids are unique, coordinates are in range, exactly one stop is
/// the depot, and at least two customer stops exist. Positions in this set
/// are the indices used by the matrices and by every route.
#[derive(Debug, Clone)]
pub struct StopSet {
    stops: Vec<Stop>,
    depot: usize,
}

impl StopSet {
    /// Validates `stops` and builds the table.
    ///
    /// # Errors
    ///
    /// Returns the first [`RoutingError`] found: invalid coordinates or
    /// attributes, duplicate ids, zero or multiple depots, or fewer than two
    /// customers.
    pub fn new(stops: Vec<Stop>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(stops.len());
        for stop in &stops {
            stop.validate()?;
            if !seen.insert(stop.id()) {
                return Err(RoutingError::DuplicateStopId(stop.id.clone()));
            }
        }

        let depots: Vec<usize> = stops
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.is_depot.then_some(i))
            .collect();
        let depot = match depots.as_slice() {
            [] => return Err(RoutingError::MissingDepot),
            [d] => *d,
            many => return Err(RoutingError::MultipleDepots(many.len())),
        };

        let customers = stops.len() - 1;
        if customers < 2 {
            return Err(RoutingError::NotEnoughCustomers(customers));
        }

        Ok(Self { stops, depot })
    }

    /// Builds the table designating the stop with `depot_id` as the depot.
    ///
    /// Any depot flags already present are cleared first.
    pub fn with_depot_id(stops: Vec<Stop>, depot_id: &str) -> Result<Self> {
        if !stops.iter().any(|s| s.id == depot_id) {
            return Err(RoutingError::UnknownDepot(depot_id.to_string()));
        }
        let stops = stops
            .into_iter()
            .map(|s| {
                let flag = s.id == depot_id;
                s.with_depot_flag(flag)
            })
            .collect();
        Self::new(stops)
    }

    /// All stops, in position order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Stop at position `index`.
    pub fn get(&self, index: usize) -> &Stop {
        &self.stops[index]
    }

    /// Number of stops including the depot.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always `false`; a valid table holds at least three stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Position of the depot.
    pub fn depot(&self) -> usize {
        self.depot
    }

    /// Positions of all customer stops, in order.
    pub fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.stops.len()).filter(move |&i| i != self.depot)
    }

    /// Number of customer stops.
    pub fn num_customers(&self) -> usize {
        self.stops.len() - 1
    }

    /// Sum of customer demand.
    pub fn total_demand(&self) -> f64 {
        self.customers().map(|i| self.stops[i].demand).sum()
    }

    /// Largest single-stop demand.
    pub fn max_demand(&self) -> f64 {
        self.customers()
            .map(|i| self.stops[i].demand)
            .fold(0.0, f64::max)
    }

    /// Returns `true` if any customer carries nonzero demand.
    pub fn has_demand(&self) -> bool {
        self.customers().any(|i| self.stops[i].demand > 0.0)
    }

    /// Returns `true` if any customer declares a time window bound.
    pub fn has_time_windows(&self) -> bool {
        self.customers()
            .any(|i| !self.stops[i].time_window.is_unbounded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Stop> {
        vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 1.0),
            Stop::new("B", 0.0, 2.0),
        ]
    }

    #[test]
    fn test_time_window_valid() {
        let tw = TimeWindow::new(Some(10.0), Some(20.0)).expect("valid");
        assert_eq!(tw.earliest(), Some(10.0));
        assert_eq!(tw.latest(), Some(20.0));
        assert!(!tw.is_unbounded());
    }

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(Some(20.0), Some(10.0)).is_none());
        assert!(TimeWindow::new(Some(f64::NAN), None).is_none());
        assert!(TimeWindow::new(None, Some(f64::INFINITY)).is_none());
    }

    #[test]
    fn test_time_window_one_sided() {
        let open_ended = TimeWindow::new(Some(600.0), None).expect("valid");
        assert!(open_ended.contains(1_000.0));
        assert!(!open_ended.contains(599.0));
        assert!(!open_ended.is_violated(10_000.0));

        let deadline = TimeWindow::new(None, Some(600.0)).expect("valid");
        assert!(deadline.contains(0.0));
        assert!(deadline.is_violated(600.5));
        assert_eq!(deadline.waiting_time(0.0), 0.0);
    }

    #[test]
    fn test_time_window_waiting() {
        let tw = TimeWindow::new(Some(10.0), Some(20.0)).expect("valid");
        assert!((tw.waiting_time(5.0) - 5.0).abs() < 1e-10);
        assert!(tw.waiting_time(10.0).abs() < 1e-10);
        assert!(tw.waiting_time(15.0).abs() < 1e-10);
    }

    #[test]
    fn test_stop_defaults() {
        let s = Stop::new("A", 1.0, 2.0);
        assert_eq!(s.id(), "A");
        assert_eq!(s.demand(), 0.0);
        assert_eq!(s.service_minutes(), 0.0);
        assert!(s.time_window().is_unbounded());
        assert!(!s.is_depot());
    }

    #[test]
    fn test_stop_set_valid() {
        let set = StopSet::new(sample()).expect("valid");
        assert_eq!(set.len(), 3);
        assert_eq!(set.depot(), 0);
        assert_eq!(set.customers().collect::<Vec<_>>(), vec![1, 2]);
        assert!(!set.has_demand());
        assert!(!set.has_time_windows());
    }

    #[test]
    fn test_stop_set_depot_not_first() {
        let stops = vec![
            Stop::new("A", 0.0, 1.0),
            Stop::depot("D", 0.0, 0.0),
            Stop::new("B", 0.0, 2.0),
        ];
        let set = StopSet::new(stops).expect("valid");
        assert_eq!(set.depot(), 1);
        assert_eq!(set.customers().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_stop_set_rejects_bad_coordinates() {
        let mut stops = sample();
        stops.push(Stop::new("C", 91.0, 0.0));
        assert!(matches!(
            StopSet::new(stops),
            Err(RoutingError::InvalidCoordinates { .. })
        ));

        let mut stops = sample();
        stops.push(Stop::new("C", 0.0, f64::NAN));
        assert!(matches!(
            StopSet::new(stops),
            Err(RoutingError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_stop_set_rejects_negative_demand() {
        let mut stops = sample();
        stops.push(Stop::new("C", 0.0, 3.0).with_demand(-1.0));
        assert!(matches!(
            StopSet::new(stops),
            Err(RoutingError::InvalidStopAttribute { field: "demand", .. })
        ));
    }

    #[test]
    fn test_stop_set_rejects_inverted_window() {
        let mut stops = sample();
        stops.push(Stop::new("C", 0.0, 3.0).with_time_window(Some(700.0), Some(600.0)));
        assert!(matches!(
            StopSet::new(stops),
            Err(RoutingError::InvertedTimeWindow { .. })
        ));
    }

    #[test]
    fn test_stop_set_depot_count() {
        let stops = vec![
            Stop::new("A", 0.0, 1.0),
            Stop::new("B", 0.0, 2.0),
            Stop::new("C", 0.0, 3.0),
        ];
        assert_eq!(StopSet::new(stops).unwrap_err(), RoutingError::MissingDepot);

        let mut stops = sample();
        stops.push(Stop::depot("D2", 1.0, 1.0));
        assert_eq!(
            StopSet::new(stops).unwrap_err(),
            RoutingError::MultipleDepots(2)
        );
    }

    #[test]
    fn test_stop_set_needs_two_customers() {
        let stops = vec![Stop::depot("D", 0.0, 0.0), Stop::new("A", 0.0, 1.0)];
        assert_eq!(
            StopSet::new(stops).unwrap_err(),
            RoutingError::NotEnoughCustomers(1)
        );
    }

    #[test]
    fn test_stop_set_duplicate_ids() {
        let mut stops = sample();
        stops.push(Stop::new("A", 1.0, 1.0));
        assert_eq!(
            StopSet::new(stops).unwrap_err(),
            RoutingError::DuplicateStopId("A".into())
        );
    }

    #[test]
    fn test_with_depot_id() {
        let stops = vec![
            Stop::new("A", 0.0, 1.0),
            Stop::new("HUB", 0.0, 0.0),
            Stop::new("B", 0.0, 2.0),
        ];
        let set = StopSet::with_depot_id(stops.clone(), "HUB").expect("valid");
        assert_eq!(set.depot(), 1);
        assert_eq!(
            StopSet::with_depot_id(stops, "NOPE").unwrap_err(),
            RoutingError::UnknownDepot("NOPE".into())
        );
    }

    #[test]
    fn test_demand_statistics() {
        let stops = vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 1.0).with_demand(2.0),
            Stop::new("B", 0.0, 2.0).with_demand(5.0),
        ];
        let set = StopSet::new(stops).expect("valid");
        assert!(set.has_demand());
        assert_eq!(set.total_demand(), 7.0);
        assert_eq!(set.max_demand(), 5.0);
    }
}
