//! Fleet and search configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutingError};

/// Rule used to build the first assignment before local search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FirstSolutionStrategy {
    /// Extend each route by the cheapest feasible arc from its last stop.
    #[default]
    PathCheapestArc,
    /// Extend each route by the feasible stop with the tightest constraints.
    PathMostConstrainedArc,
    /// Insert the stop with the globally cheapest feasible insertion, on any route.
    ParallelCheapestInsertion,
    /// Clarke-Wright savings merges.
    Savings,
    /// Polar-angle sweep around the depot.
    Sweep,
}

impl FirstSolutionStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::PathCheapestArc,
        Self::PathMostConstrainedArc,
        Self::ParallelCheapestInsertion,
        Self::Savings,
        Self::Sweep,
    ];

    /// Tag used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PathCheapestArc => "PATH_CHEAPEST_ARC",
            Self::PathMostConstrainedArc => "PATH_MOST_CONSTRAINED_ARC",
            Self::ParallelCheapestInsertion => "PARALLEL_CHEAPEST_INSERTION",
            Self::Savings => "SAVINGS",
            Self::Sweep => "SWEEP",
        }
    }
}

impl fmt::Display for FirstSolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FirstSolutionStrategy {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                RoutingError::InvalidConfig(format!("unknown first-solution strategy `{s}`"))
            })
    }
}

/// Strategy for escaping local optima after construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metaheuristic {
    /// Plain descent: stop at the first local optimum.
    None,
    /// Penalize frequently used arcs at local optima.
    #[default]
    GuidedLocalSearch,
    /// Forbid recently moved stops for a number of iterations.
    TabuSearch,
    /// Accept worsening moves with a cooling probability.
    SimulatedAnnealing,
}

impl Metaheuristic {
    /// All metaheuristics, in declaration order.
    pub const ALL: [Self; 4] = [
        Self::None,
        Self::GuidedLocalSearch,
        Self::TabuSearch,
        Self::SimulatedAnnealing,
    ];

    /// Tag used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::GuidedLocalSearch => "GUIDED_LOCAL_SEARCH",
            Self::TabuSearch => "TABU_SEARCH",
            Self::SimulatedAnnealing => "SIMULATED_ANNEALING",
        }
    }
}

impl fmt::Display for Metaheuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metaheuristic {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RoutingError::InvalidConfig(format!("unknown metaheuristic `{s}`")))
    }
}

/// Depot operating hours in minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepotWindow {
    /// Opening time; every route starts at or after it.
    pub open: f64,
    /// Closing time; every route returns at or before it.
    pub close: f64,
}

impl DepotWindow {
    /// Creates a window from whole opening and closing hours.
    pub fn from_hours(open_hour: u32, close_hour: u32) -> Self {
        Self {
            open: f64::from(open_hour * 60),
            close: f64::from(close_hour * 60),
        }
    }

    /// Length of the window in minutes.
    pub fn length(&self) -> f64 {
        self.close - self.open
    }
}

impl Default for DepotWindow {
    fn default() -> Self {
        Self::from_hours(8, 20)
    }
}

/// Fleet, constraint, and search parameters for one optimization run.
///
/// A value object: the optimizer reads it without mutation, and the
/// relaxation controller derives modified copies.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_lastmile::models::{FleetConfig, Metaheuristic};
///
/// let config = FleetConfig::default()
///     .with_vehicles(3)
///     .with_capacity(40.0)
///     .with_metaheuristic(Metaheuristic::TabuSearch)
///     .with_time_limit(Duration::from_secs(5));
/// assert_eq!(config.num_vehicles, 3);
/// assert_eq!(config.capacity, Some(40.0));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Vehicles available; all start and end at the depot.
    pub num_vehicles: usize,
    /// Per-vehicle capacity. `None` means uncapacitated.
    pub capacity: Option<f64>,
    /// Maximum route duration in hours. `None` means no cap.
    pub max_route_duration_hours: Option<f64>,
    /// Depot operating hours.
    pub depot_window: DepotWindow,
    /// Travel speed used to turn distances into times.
    pub speed_kmh: f64,
    /// Whether stop time windows are enforced.
    pub enforce_time_windows: bool,
    /// Construction rule for the first assignment.
    pub first_solution_strategy: FirstSolutionStrategy,
    /// Local-search metaheuristic.
    pub metaheuristic: Metaheuristic,
    /// Wall-clock budget for the search.
    pub time_limit: Duration,
    /// Iterations without a new best solution before the search stops early.
    pub max_stall_iterations: usize,
    /// Seed for the stochastic metaheuristics.
    pub seed: u64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            num_vehicles: 5,
            capacity: None,
            max_route_duration_hours: Some(8.0),
            depot_window: DepotWindow::default(),
            speed_kmh: 45.0,
            enforce_time_windows: true,
            first_solution_strategy: FirstSolutionStrategy::default(),
            metaheuristic: Metaheuristic::default(),
            time_limit: Duration::from_secs(30),
            max_stall_iterations: 5_000,
            seed: 42,
        }
    }
}

impl FleetConfig {
    /// Sets the number of vehicles.
    pub fn with_vehicles(mut self, n: usize) -> Self {
        self.num_vehicles = n;
        self
    }

    /// Sets the vehicle capacity.
    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Removes the capacity constraint.
    pub fn without_capacity(mut self) -> Self {
        self.capacity = None;
        self
    }

    /// Sets the maximum route duration in hours.
    pub fn with_max_route_hours(mut self, hours: f64) -> Self {
        self.max_route_duration_hours = Some(hours);
        self
    }

    /// Removes the route duration cap.
    pub fn without_max_route_hours(mut self) -> Self {
        self.max_route_duration_hours = None;
        self
    }

    /// Sets the depot operating window.
    pub fn with_depot_window(mut self, window: DepotWindow) -> Self {
        self.depot_window = window;
        self
    }

    /// Sets the travel speed.
    pub fn with_speed(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = speed_kmh;
        self
    }

    /// Enables or disables time window enforcement.
    pub fn with_time_windows(mut self, enforce: bool) -> Self {
        self.enforce_time_windows = enforce;
        self
    }

    /// Sets the first-solution strategy.
    pub fn with_first_solution(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.first_solution_strategy = strategy;
        self
    }

    /// Sets the local-search metaheuristic.
    pub fn with_metaheuristic(mut self, metaheuristic: Metaheuristic) -> Self {
        self.metaheuristic = metaheuristic;
        self
    }

    /// Sets the search time budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// Sets the stall limit.
    pub fn with_max_stall_iterations(mut self, n: usize) -> Self {
        self.max_stall_iterations = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Maximum route duration in minutes, if capped.
    pub fn max_route_minutes(&self) -> Option<f64> {
        self.max_route_duration_hours.map(|h| h * 60.0)
    }

    /// Checks that every numeric parameter is usable.
    ///
    /// A vehicle count of zero is not rejected here; it is reported as an
    /// infeasible outcome by the solvers.
    pub fn validate(&self) -> Result<()> {
        if !self.speed_kmh.is_finite() || self.speed_kmh <= 0.0 {
            return Err(RoutingError::InvalidConfig(format!(
                "speed must be positive, got {} km/h",
                self.speed_kmh
            )));
        }
        if let Some(capacity) = self.capacity {
            if !capacity.is_finite() || capacity < 0.0 {
                return Err(RoutingError::InvalidConfig(format!(
                    "capacity must be a non-negative number, got {capacity}"
                )));
            }
        }
        if let Some(hours) = self.max_route_duration_hours {
            if !hours.is_finite() || hours <= 0.0 {
                return Err(RoutingError::InvalidConfig(format!(
                    "maximum route duration must be positive, got {hours} h"
                )));
            }
        }
        let DepotWindow { open, close } = self.depot_window;
        if !open.is_finite() || !close.is_finite() || open < 0.0 || open > close {
            return Err(RoutingError::InvalidConfig(format!(
                "depot window must satisfy 0 <= open <= close, got {open}..{close}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = FleetConfig::default();
        assert_eq!(c.num_vehicles, 5);
        assert!(c.capacity.is_none());
        assert_eq!(c.max_route_minutes(), Some(480.0));
        assert_eq!(c.depot_window, DepotWindow { open: 480.0, close: 1200.0 });
        assert_eq!(c.first_solution_strategy, FirstSolutionStrategy::PathCheapestArc);
        assert_eq!(c.metaheuristic, Metaheuristic::GuidedLocalSearch);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let c = FleetConfig::default()
            .with_vehicles(2)
            .with_capacity(10.0)
            .without_max_route_hours()
            .with_speed(60.0)
            .with_time_windows(false)
            .with_seed(7);
        assert_eq!(c.num_vehicles, 2);
        assert_eq!(c.capacity, Some(10.0));
        assert!(c.max_route_minutes().is_none());
        assert_eq!(c.speed_kmh, 60.0);
        assert!(!c.enforce_time_windows);
        assert_eq!(c.seed, 7);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(FleetConfig::default().with_speed(0.0).validate().is_err());
        assert!(FleetConfig::default().with_capacity(f64::NAN).validate().is_err());
        assert!(FleetConfig::default().with_max_route_hours(-1.0).validate().is_err());
        let inverted = DepotWindow { open: 600.0, close: 500.0 };
        assert!(FleetConfig::default()
            .with_depot_window(inverted)
            .validate()
            .is_err());
    }

    #[test]
    fn test_strategy_tags_round_trip() {
        for s in FirstSolutionStrategy::ALL {
            assert_eq!(s.as_str().parse::<FirstSolutionStrategy>(), Ok(s));
        }
        for m in Metaheuristic::ALL {
            assert_eq!(m.to_string().parse::<Metaheuristic>(), Ok(m));
        }
        assert_eq!(
            "guided_local_search".parse::<Metaheuristic>(),
            Ok(Metaheuristic::GuidedLocalSearch)
        );
        assert!("CHRISTOFIDES".parse::<FirstSolutionStrategy>().is_err());
    }

    #[test]
    fn test_serde_uses_tags() {
        let json = serde_json::to_value(FleetConfig::default()).expect("serializable");
        assert_eq!(json["first_solution_strategy"], "PATH_CHEAPEST_ARC");
        assert_eq!(json["metaheuristic"], "GUIDED_LOCAL_SEARCH");

        let parsed: FleetConfig =
            serde_json::from_str(r#"{"num_vehicles": 3, "metaheuristic": "TABU_SEARCH"}"#)
                .expect("partial config");
        assert_eq!(parsed.num_vehicles, 3);
        assert_eq!(parsed.metaheuristic, Metaheuristic::TabuSearch);
        assert_eq!(parsed.speed_kmh, 45.0);
    }

    #[test]
    fn test_depot_window_hours() {
        let w = DepotWindow::from_hours(8, 18);
        assert_eq!(w.open, 480.0);
        assert_eq!(w.close, 1080.0);
        assert_eq!(w.length(), 600.0);
    }
}
