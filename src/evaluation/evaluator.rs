//! Route evaluator that computes totals, schedules, and constraint violations.

use serde::{Deserialize, Serialize};

use crate::distance::{DistanceMatrix, TimeMatrix};
use crate::models::{DepotWindow, FleetConfig, Route, StopSet};

/// Time rules applied to every route when the time dimension is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRules {
    depot_window: DepotWindow,
    enforce_windows: bool,
    max_duration: Option<f64>,
}

impl TimeRules {
    /// Creates rules from a depot window, window enforcement, and an optional
    /// duration cap in minutes.
    pub fn new(depot_window: DepotWindow, enforce_windows: bool, max_duration: Option<f64>) -> Self {
        Self {
            depot_window,
            enforce_windows,
            max_duration,
        }
    }

    /// Depot operating window.
    pub fn depot_window(&self) -> DepotWindow {
        self.depot_window
    }

    /// Whether stop time windows are enforced.
    pub fn enforce_windows(&self) -> bool {
        self.enforce_windows
    }

    /// Duration cap in minutes, if any.
    pub fn max_duration(&self) -> Option<f64> {
        self.max_duration
    }
}

/// The constraints a configuration actually enforces on a stop set.
///
/// Capacity applies only when a capacity is configured and some stop carries
/// demand. Time applies when windows are enforced and present, or when a
/// duration cap is set.
///
/// # Examples
///
/// ```
/// use u_lastmile::models::{FleetConfig, Stop, StopSet};
/// use u_lastmile::evaluation::Constraints;
///
/// let stops = StopSet::new(vec![
///     Stop::depot("D", 0.0, 0.0),
///     Stop::new("A", 0.0, 1.0),
///     Stop::new("B", 0.0, 2.0),
/// ]).unwrap();
/// let config = FleetConfig::default().with_capacity(10.0).without_max_route_hours();
/// let c = Constraints::from_config(&config, &stops);
/// assert!(c.capacity.is_none());
/// assert!(c.time.is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Constraints {
    /// Vehicle capacity, when enforced.
    pub capacity: Option<f64>,
    /// Time rules, when the time dimension is active.
    pub time: Option<TimeRules>,
}

impl Constraints {
    /// Derives the enforced constraints.
    pub fn from_config(config: &FleetConfig, stops: &StopSet) -> Self {
        let capacity = config.capacity.filter(|_| stops.has_demand());
        let windows = config.enforce_time_windows && stops.has_time_windows();
        let max_duration = config.max_route_minutes();
        let time = (windows || max_duration.is_some())
            .then(|| TimeRules::new(config.depot_window, windows, max_duration));
        Self { capacity, time }
    }

    /// No constraints at all.
    pub fn none() -> Self {
        Self::default()
    }
}

/// Per-route sums as observed by callers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteTotals {
    /// Kilometers, including the return leg.
    pub distance: f64,
    /// Travel plus service minutes.
    pub time: f64,
    /// Delivered demand.
    pub demand: f64,
}

/// A timed stop visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Stop position.
    pub stop: usize,
    /// Arrival time, minutes from midnight.
    pub arrival: f64,
    /// Service start after any wait.
    pub start: f64,
    /// Departure after service.
    pub departure: f64,
}

/// Outcome of propagating times along a feasible route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeProfile {
    /// Return time at the depot when leaving at opening time.
    pub end: f64,
    /// Total minutes spent waiting for windows to open.
    pub waiting: f64,
    /// Shortest achievable depot-to-depot span, delaying the departure
    /// where that removes waiting.
    pub span: f64,
}

/// A constraint violation found on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    /// Cumulative demand exceeds capacity.
    CapacityExceeded {
        /// Route load.
        load: f64,
        /// Vehicle capacity.
        capacity: f64,
    },
    /// Service would start after the stop's window closes.
    TimeWindowViolated {
        /// Stop position.
        stop: usize,
        /// Service start.
        start: f64,
        /// Window close.
        latest: f64,
    },
    /// The vehicle returns after the depot closes.
    DepotClosed {
        /// Return time.
        end: f64,
        /// Depot closing time.
        close: f64,
    },
    /// Route span exceeds the duration cap.
    MaxDurationExceeded {
        /// Shortest achievable span.
        duration: f64,
        /// Cap in minutes.
        max_duration: f64,
    },
}

/// State of a route under construction, extended one stop at a time.
///
/// [`RouteEvaluator::extend`] gives the same verdict as
/// [`RouteEvaluator::is_feasible`] on the full sequence, in constant time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteTail {
    last: usize,
    len: usize,
    load: f64,
    time: f64,
    waiting: f64,
    max_delay: f64,
}

impl RouteTail {
    /// Last stop on the route (the depot when empty).
    pub fn last(&self) -> usize {
        self.last
    }

    /// Number of customers on the route.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no customer has been added.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Accumulated load.
    pub fn load(&self) -> f64 {
        self.load
    }
}

/// Measures routes and checks them against [`Constraints`].
///
/// Routes are given as customer sequences; the depot is implied at both ends.
///
/// # Examples
///
/// ```
/// use u_lastmile::models::{Stop, StopSet};
/// use u_lastmile::distance::{DistanceMatrix, TimeMatrix};
/// use u_lastmile::evaluation::RouteEvaluator;
///
/// let stops = StopSet::new(vec![
///     Stop::depot("D", 0.0, 0.0),
///     Stop::new("A", 0.0, 1.0).with_demand(2.0).with_service_minutes(5.0),
///     Stop::new("B", 0.0, 2.0).with_demand(3.0),
/// ]).unwrap();
/// let dm = DistanceMatrix::from_stops(&stops).unwrap();
/// let tm = TimeMatrix::from_distances(&dm, 60.0).unwrap();
///
/// let eval = RouteEvaluator::new(&stops, &dm, &tm);
/// let totals = eval.totals(&[1, 2]);
/// assert!((totals.distance - 2.0 * dm.get(0, 2)).abs() < 1e-3);
/// assert_eq!(totals.demand, 5.0);
/// ```
pub struct RouteEvaluator<'a> {
    stops: &'a StopSet,
    distances: &'a DistanceMatrix,
    times: &'a TimeMatrix,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates an evaluator over shared problem data.
    pub fn new(stops: &'a StopSet, distances: &'a DistanceMatrix, times: &'a TimeMatrix) -> Self {
        Self {
            stops,
            distances,
            times,
        }
    }

    /// The stop table.
    pub fn stops(&self) -> &'a StopSet {
        self.stops
    }

    /// The distance matrix.
    pub fn distances(&self) -> &'a DistanceMatrix {
        self.distances
    }

    /// The time matrix.
    pub fn times(&self) -> &'a TimeMatrix {
        self.times
    }

    /// Distance, time, and demand sums over consecutive stop pairs.
    pub fn totals(&self, customers: &[usize]) -> RouteTotals {
        if customers.is_empty() {
            return RouteTotals::default();
        }
        let depot = self.stops.depot();
        let mut totals = RouteTotals::default();
        let mut prev = depot;
        for &c in customers.iter().chain(std::iter::once(&depot)) {
            totals.distance += self.distances.get(prev, c);
            totals.time += self.times.get(prev, c);
            prev = c;
        }
        for &c in customers {
            let stop = self.stops.get(c);
            totals.time += stop.service_minutes();
            totals.demand += stop.demand();
        }
        totals
    }

    /// Builds a [`Route`] with its totals for the given vehicle.
    pub fn build_route(&self, vehicle_id: usize, customers: &[usize]) -> Route {
        let depot = self.stops.depot();
        let totals = self.totals(customers);
        let mut seq = Vec::with_capacity(customers.len() + 2);
        seq.push(depot);
        seq.extend_from_slice(customers);
        seq.push(depot);
        Route::new(vehicle_id, seq, totals.distance, totals.time, totals.demand)
    }

    /// Sum of demand over the sequence.
    pub fn load(&self, customers: &[usize]) -> f64 {
        customers.iter().map(|&c| self.stops.get(c).demand()).sum()
    }

    /// Propagates service start times from the depot opening, stopping at
    /// the first violated time rule.
    ///
    /// Transit between two stops is the travel time plus the service time
    /// of the origin stop.
    pub fn time_profile(&self, customers: &[usize], rules: &TimeRules) -> Result<TimeProfile, Violation> {
        self.propagate(customers, rules, |_| {})
    }

    /// Earliest-start schedule: leaves the depot at opening time and waits
    /// wherever a window has not opened yet.
    pub fn schedule(&self, customers: &[usize], rules: &TimeRules) -> (Vec<Visit>, Result<TimeProfile, Violation>) {
        let mut visits = Vec::with_capacity(customers.len());
        let profile = self.propagate(customers, rules, |v| visits.push(v));
        (visits, profile)
    }

    /// Returns `true` if the sequence satisfies every enforced constraint.
    pub fn is_feasible(&self, customers: &[usize], constraints: &Constraints) -> bool {
        if let Some(capacity) = constraints.capacity {
            if self.load(customers) > capacity {
                return false;
            }
        }
        match &constraints.time {
            Some(rules) => self.time_profile(customers, rules).is_ok(),
            None => true,
        }
    }

    /// Lists violations: capacity, then the first time rule broken.
    pub fn violations(&self, customers: &[usize], constraints: &Constraints) -> Vec<Violation> {
        let mut violations = Vec::new();
        if let Some(capacity) = constraints.capacity {
            let load = self.load(customers);
            if load > capacity {
                violations.push(Violation::CapacityExceeded { load, capacity });
            }
        }
        if let Some(rules) = &constraints.time {
            if let Err(v) = self.time_profile(customers, rules) {
                violations.push(v);
            }
        }
        violations
    }

    /// An empty route at the depot.
    pub fn start_tail(&self, constraints: &Constraints) -> RouteTail {
        let (open, max_delay) = constraints
            .time
            .map_or((0.0, 0.0), |r| (r.depot_window.open, r.depot_window.length()));
        RouteTail {
            last: self.stops.depot(),
            len: 0,
            load: 0.0,
            time: open,
            waiting: 0.0,
            max_delay,
        }
    }

    /// Appends `next` to the route, returning the new state if the route
    /// including its return to the depot stays feasible.
    pub fn extend(&self, tail: &RouteTail, next: usize, constraints: &Constraints) -> Option<RouteTail> {
        let stop = self.stops.get(next);
        let load = tail.load + stop.demand();
        if constraints.capacity.is_some_and(|c| load > c) {
            return None;
        }
        let mut out = RouteTail {
            last: next,
            len: tail.len + 1,
            load,
            ..*tail
        };
        let Some(rules) = &constraints.time else {
            return Some(out);
        };

        let prev = self.stops.get(tail.last);
        let arrival = tail.time + prev.service_minutes() + self.times.get(tail.last, next);
        let (earliest, latest) = if rules.enforce_windows {
            (stop.time_window().earliest(), stop.time_window().latest())
        } else {
            (None, None)
        };
        let start = earliest.map_or(arrival, |e| arrival.max(e));
        out.waiting += start - arrival;
        if let Some(l) = latest {
            if start > l {
                return None;
            }
            out.max_delay = out.max_delay.min(out.waiting + l - start);
        }
        out.time = start;

        let DepotWindow { open, close } = rules.depot_window;
        let end = start + stop.service_minutes() + self.times.get(next, self.stops.depot());
        if end > close {
            return None;
        }
        let span = end - open - out.waiting.min(out.max_delay).max(0.0);
        if rules.max_duration.is_some_and(|m| span > m) {
            return None;
        }
        Some(out)
    }

    fn propagate(
        &self,
        customers: &[usize],
        rules: &TimeRules,
        mut on_visit: impl FnMut(Visit),
    ) -> Result<TimeProfile, Violation> {
        let DepotWindow { open, close } = rules.depot_window;
        let depot = self.stops.depot();

        let mut t = open;
        let mut prev = depot;
        let mut waiting = 0.0;
        // Largest departure delay that keeps every window satisfied.
        let mut max_delay = close - open;

        for &c in customers {
            let arrival = t + self.stops.get(prev).service_minutes() + self.times.get(prev, c);
            let stop = self.stops.get(c);
            let (earliest, latest) = if rules.enforce_windows {
                (stop.time_window().earliest(), stop.time_window().latest())
            } else {
                (None, None)
            };
            let start = earliest.map_or(arrival, |e| arrival.max(e));
            waiting += start - arrival;
            if let Some(l) = latest {
                if start > l {
                    return Err(Violation::TimeWindowViolated {
                        stop: c,
                        start,
                        latest: l,
                    });
                }
                max_delay = max_delay.min(waiting + l - start);
            }
            on_visit(Visit {
                stop: c,
                arrival,
                start,
                departure: start + stop.service_minutes(),
            });
            t = start;
            prev = c;
        }

        let end = t + self.stops.get(prev).service_minutes() + self.times.get(prev, depot);
        if end > close {
            return Err(Violation::DepotClosed { end, close });
        }

        let span = end - open - waiting.min(max_delay).max(0.0);
        if let Some(max_duration) = rules.max_duration {
            if span > max_duration {
                return Err(Violation::MaxDurationExceeded {
                    duration: span,
                    max_duration,
                });
            }
        }
        Ok(TimeProfile { end, waiting, span })
    }
}
