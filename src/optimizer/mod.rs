//! Constraint-based route optimizer.
//!
//! - [`RoutingModel`]: Arc costs plus capacity and time [`Dimension`]s
//! - [`search`]: Descent, guided local search, tabu search, simulated annealing
//! - [`Optimizer`]: Construction, search, and route extraction in one call
//!
//! Infeasibility is returned as [`Outcome::Infeasible`]; only malformed
//! configuration or mismatched matrices are errors.

mod dimension;
mod model;
mod penalty;
pub mod search;

pub use dimension::Dimension;
pub use model::{Routes, RoutingModel};
pub use penalty::PenaltyMatrix;
pub use search::{improve, SearchParams, SearchResult, StopReason};

use std::time::Instant;

use tracing::{info, instrument};

use crate::constructive::{build_initial, nearest_feasible};
use crate::distance::{DistanceMatrix, TimeMatrix};
use crate::error::{Result, RoutingError};
use crate::models::{FleetConfig, Infeasibility, Outcome, Solution, StopSet};

/// Solves the routing problem over one stop set and its matrices.
///
/// The matrices are shared read-only between calls; every call builds its
/// own model and search state, so one optimizer can serve many
/// configurations.
///
/// # Examples
///
/// ```
/// use u_lastmile::models::{FleetConfig, Metaheuristic, Stop, StopSet};
/// use u_lastmile::distance::{haversine_km, DistanceMatrix, TimeMatrix};
/// use u_lastmile::optimizer::Optimizer;
///
/// let stops = StopSet::new(vec![
///     Stop::depot("D", 0.0, 0.0),
///     Stop::new("A", 0.0, 1.0),
///     Stop::new("B", 0.0, 2.0),
/// ]).unwrap();
/// let dm = DistanceMatrix::from_stops(&stops).unwrap();
/// let tm = TimeMatrix::from_distances(&dm, 60.0).unwrap();
/// let config = FleetConfig::default()
///     .with_vehicles(1)
///     .with_speed(60.0)
///     .without_max_route_hours()
///     .with_metaheuristic(Metaheuristic::None);
///
/// let outcome = Optimizer::new(&stops, &dm, &tm).solve(&config).unwrap();
/// let solution = outcome.solution().unwrap();
/// assert_eq!(solution.vehicles_used(), 1);
/// let expected = 2.0 * haversine_km(0.0, 0.0, 0.0, 2.0);
/// assert!((solution.total_distance() - expected).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Optimizer<'a> {
    stops: &'a StopSet,
    distances: &'a DistanceMatrix,
    times: &'a TimeMatrix,
}

impl<'a> Optimizer<'a> {
    /// Creates an optimizer over `stops` and their matrices.
    pub fn new(stops: &'a StopSet, distances: &'a DistanceMatrix, times: &'a TimeMatrix) -> Self {
        Self {
            stops,
            distances,
            times,
        }
    }

    /// Stops being routed.
    pub fn stops(&self) -> &'a StopSet {
        self.stops
    }

    /// Distance matrix in use.
    pub fn distances(&self) -> &'a DistanceMatrix {
        self.distances
    }

    /// Builds a first solution, improves it within the time budget, and
    /// extracts the used routes.
    ///
    /// When the first-solution strategy leaves stops unplaced, the greedy
    /// baseline is tried with the same configuration; a complete baseline
    /// seeds the search instead. The run is infeasible only if both fail.
    ///
    /// `config.time_limit` covers construction and search together: the
    /// search gets whatever construction left over. Construction itself
    /// always runs to completion, so a tiny budget can still be exceeded by
    /// the construction time.
    ///
    /// The time matrix is rebuilt when `config.speed_kmh` differs from the
    /// speed it was built with.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::InvalidConfig`] if `config` fails validation
    /// - [`RoutingError::MatrixSizeMismatch`] if a matrix does not match the stop set
    #[instrument(
        skip_all,
        fields(
            stops = self.stops.len(),
            vehicles = config.num_vehicles,
            strategy = %config.first_solution_strategy,
            metaheuristic = %config.metaheuristic,
        )
    )]
    pub fn solve(&self, config: &FleetConfig) -> Result<Outcome> {
        config.validate()?;
        for size in [self.distances.size(), self.times.size()] {
            if size != self.stops.len() {
                return Err(RoutingError::MatrixSizeMismatch {
                    matrix: size,
                    stops: self.stops.len(),
                });
            }
        }

        if self.stops.len() < 2 {
            return Ok(Outcome::Infeasible(Infeasibility::not_enough_stops()));
        }
        if config.num_vehicles < 1 {
            return Ok(Outcome::Infeasible(Infeasibility::no_vehicles()));
        }

        let started = Instant::now();
        let rebuilt;
        let times = if (self.times.speed_kmh() - config.speed_kmh).abs() > f64::EPSILON {
            rebuilt = TimeMatrix::from_distances(self.distances, config.speed_kmh)?;
            &rebuilt
        } else {
            self.times
        };

        let model = RoutingModel::new(self.stops, self.distances, times, config);
        let (mut routes, unplaced) = build_initial(&model, config.first_solution_strategy);
        if !unplaced.is_empty() {
            match self.baseline_routes(&model, times, config) {
                Some(baseline) => {
                    info!(
                        unplaced = unplaced.len(),
                        "first solution incomplete, starting from the greedy baseline"
                    );
                    routes = baseline;
                }
                None => {
                    info!(unplaced = unplaced.len(), "no feasible first solution");
                    return Ok(Outcome::Infeasible(Infeasibility::no_feasible_assignment(
                        unplaced.len(),
                    )));
                }
            }
        }

        let mut params = SearchParams::from_config(config);
        params.time_limit = config.time_limit.saturating_sub(started.elapsed());
        let result = improve(&model, routes, &params);
        let eval = model.evaluator();
        let routes = result
            .routes
            .iter()
            .enumerate()
            .map(|(vehicle_id, r)| eval.build_route(vehicle_id, r))
            .collect();
        let solution = Solution::new(routes, Vec::new());
        info!(
            vehicles_used = solution.vehicles_used(),
            total_distance_km = solution.total_distance(),
            total_time_min = solution.total_time(),
            "optimized routes"
        );
        Ok(Outcome::Solved(solution))
    }

    /// Routes of a complete greedy baseline, one per vehicle, if every route
    /// also satisfies the model.
    fn baseline_routes(&self, model: &RoutingModel<'_>, times: &TimeMatrix, config: &FleetConfig) -> Option<Routes> {
        let solution = nearest_feasible(self.stops, self.distances, times, config).into_solution()?;
        if !solution.is_complete() {
            return None;
        }
        let mut routes: Routes = vec![Vec::new(); model.num_vehicles()];
        for route in solution.routes() {
            *routes.get_mut(route.vehicle_id())? = route.customers().to_vec();
        }
        routes.iter().all(|r| model.is_feasible(r)).then_some(routes)
    }
}
