//! Solution, infeasibility, and outcome types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Route;

/// A set of used routes with aggregate totals.
///
/// Totals are the plain sums of the per-route values, accumulated in route
/// order. Stops that could not be placed are listed in [`unassigned`].
///
/// [`unassigned`]: Solution::unassigned
///
/// # Examples
///
/// ```
/// use u_lastmile::models::{Route, Solution};
///
/// let sol = Solution::new(
///     vec![
///         Route::new(0, vec![0, 1, 0], 10.0, 15.0, 2.0),
///         Route::new(2, vec![0, 2, 3, 0], 20.0, 25.0, 3.0),
///     ],
///     vec![],
/// );
/// assert_eq!(sol.vehicles_used(), 2);
/// assert_eq!(sol.total_distance(), 30.0);
/// assert_eq!(sol.num_served(), 3);
/// assert!(sol.is_complete());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
    total_distance: f64,
    total_time: f64,
    unassigned: Vec<usize>,
}

impl Solution {
    /// Builds a solution from routes; unused routes are dropped.
    pub fn new(routes: Vec<Route>, unassigned: Vec<usize>) -> Self {
        let routes: Vec<Route> = routes.into_iter().filter(Route::is_used).collect();
        let total_distance = routes.iter().map(Route::distance).sum();
        let total_time = routes.iter().map(Route::time).sum();
        Self {
            routes,
            total_distance,
            total_time,
            unassigned,
        }
    }

    /// Used routes, ordered by vehicle.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Number of vehicles with at least one customer.
    pub fn vehicles_used(&self) -> usize {
        self.routes.len()
    }

    /// Sum of route distances (km).
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Sum of route times (minutes).
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    /// Sum of delivered demand.
    pub fn total_demand(&self) -> f64 {
        self.routes.iter().map(Route::demand).sum()
    }

    /// Customer stops that no route visits.
    pub fn unassigned(&self) -> &[usize] {
        &self.unassigned
    }

    /// Number of customers served.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(Route::num_stops).sum()
    }

    /// Returns `true` if every customer is served.
    pub fn is_complete(&self) -> bool {
        self.unassigned.is_empty()
    }
}

/// Why a run produced no solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfeasibilityKind {
    /// Fewer than two stops to route.
    NotEnoughStops,
    /// Fewer than one vehicle.
    NoVehicles,
    /// The search found no assignment satisfying the enforced constraints.
    NoFeasibleAssignment,
}

/// An explicit infeasibility marker with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Infeasibility {
    /// Category of the failure.
    pub kind: InfeasibilityKind,
    /// Message suitable for end users, including a remedy.
    pub reason: String,
}

impl Infeasibility {
    /// Fewer than two stops.
    pub fn not_enough_stops() -> Self {
        Self {
            kind: InfeasibilityKind::NotEnoughStops,
            reason: "Not enough stops to build a route.".into(),
        }
    }

    /// Zero vehicles.
    pub fn no_vehicles() -> Self {
        Self {
            kind: InfeasibilityKind::NoVehicles,
            reason: "Number of vehicles must be at least 1.".into(),
        }
    }

    /// Search failure, naming how many stops could not be placed.
    pub fn no_feasible_assignment(unplaced: usize) -> Self {
        Self {
            kind: InfeasibilityKind::NoFeasibleAssignment,
            reason: format!(
                "No feasible solution found with current constraints ({unplaced} stops could not be placed). \
                 Try relaxing capacity, widening time windows, extending route duration, or adding vehicles."
            ),
        }
    }
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

/// Result of one solver call: a solution or an infeasibility marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// A solution was produced.
    Solved(Solution),
    /// No solution under the given parameters.
    Infeasible(Infeasibility),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Solved`].
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved(_))
    }

    /// The solution, if any.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Solved(s) => Some(s),
            Outcome::Infeasible(_) => None,
        }
    }

    /// The infeasibility marker, if any.
    pub fn infeasibility(&self) -> Option<&Infeasibility> {
        match self {
            Outcome::Solved(_) => None,
            Outcome::Infeasible(i) => Some(i),
        }
    }

    /// Consumes the outcome, returning the solution if any.
    pub fn into_solution(self) -> Option<Solution> {
        match self {
            Outcome::Solved(s) => Some(s),
            Outcome::Infeasible(_) => None,
        }
    }
}
