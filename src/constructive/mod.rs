//! Constructive heuristics for building initial solutions.
//!
//! - [`nearest_feasible`]: Greedy nearest-feasible-neighbor baseline, O(n²v)
//! - [`path_cheapest_arc`]: Extend each path by its cheapest feasible arc
//! - [`path_most_constrained_arc`]: Extend each path by its most constrained stop
//! - [`parallel_cheapest_insertion`]: Cheapest insertion over all routes at once
//! - [`savings`]: Clarke-Wright savings algorithm (1964), O(n² log n)
//! - [`sweep`]: Polar-angle sweep clustering (Gillett & Miller, 1974), O(n log n)
//!
//! The optimizer's strategies are completed by [`insert_unrouted`], which
//! places whatever the strategy left over.

mod cheapest_insertion;
mod naive;
mod path_cheapest_arc;
mod savings;
mod sweep;

pub use cheapest_insertion::{insert_unrouted, parallel_cheapest_insertion};
pub use naive::nearest_feasible;
pub use path_cheapest_arc::{path_cheapest_arc, path_most_constrained_arc};
pub use savings::savings;
pub use sweep::sweep;

use tracing::debug;

use crate::models::FirstSolutionStrategy;
use crate::optimizer::{Routes, RoutingModel};

/// Builds a first solution with `strategy`, then inserts leftover stops
/// at their cheapest feasible positions.
///
/// Returns the routes (one per vehicle) and the stops that fit nowhere.
pub fn build_initial(model: &RoutingModel<'_>, strategy: FirstSolutionStrategy) -> (Routes, Vec<usize>) {
    let mut routes = match strategy {
        FirstSolutionStrategy::PathCheapestArc => path_cheapest_arc(model),
        FirstSolutionStrategy::PathMostConstrainedArc => path_most_constrained_arc(model),
        FirstSolutionStrategy::ParallelCheapestInsertion => parallel_cheapest_insertion(model),
        FirstSolutionStrategy::Savings => savings(model),
        FirstSolutionStrategy::Sweep => sweep(model),
    };

    let mut routed = vec![false; model.num_nodes()];
    for &c in routes.iter().flatten() {
        routed[c] = true;
    }
    let leftover: Vec<usize> = model.customers().into_iter().filter(|&c| !routed[c]).collect();
    let constructed = model.customers().len() - leftover.len();
    let unplaced = if leftover.is_empty() {
        leftover
    } else {
        insert_unrouted(model, &mut routes, leftover)
    };

    debug!(
        %strategy,
        constructed,
        unplaced = unplaced.len(),
        cost = model.solution_cost(&routes),
        "built first solution"
    );
    (routes, unplaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DistanceMatrix, TimeMatrix};
    use crate::models::{FleetConfig, Stop, StopSet};

    #[test]
    fn test_every_strategy_routes_everything() {
        let stops = StopSet::new(vec![
            Stop::depot("D", 42.36, -71.06),
            Stop::new("A", 42.40, -71.10).with_demand(2.0),
            Stop::new("B", 42.30, -71.00).with_demand(3.0),
            Stop::new("C", 42.45, -70.95).with_demand(1.0),
            Stop::new("E", 42.33, -71.12).with_demand(2.0),
            Stop::new("F", 42.38, -71.02).with_demand(4.0),
        ])
        .expect("valid");
        let dm = DistanceMatrix::from_stops(&stops).expect("alloc");
        let tm = TimeMatrix::from_distances(&dm, 45.0).expect("valid");
        let config = FleetConfig::default().with_vehicles(3).with_capacity(6.0);
        let model = RoutingModel::new(&stops, &dm, &tm, &config);

        for strategy in FirstSolutionStrategy::ALL {
            let (routes, unplaced) = build_initial(&model, strategy);
            assert!(unplaced.is_empty(), "{strategy}");
            assert_eq!(routes.len(), 3);
            let mut all: Vec<usize> = routes.iter().flatten().copied().collect();
            all.sort_unstable();
            assert_eq!(all, vec![1, 2, 3, 4, 5], "{strategy}");
            assert!(routes.iter().all(|r| model.is_feasible(r)), "{strategy}");
        }
    }

    #[test]
    fn test_unplaceable_stop_reported() {
        let stops = StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 0.1),
            Stop::new("Far", 0.0, 1.0).with_time_window(None, Some(490.0)),
        ])
        .expect("valid");
        let dm = DistanceMatrix::from_stops(&stops).expect("alloc");
        let tm = TimeMatrix::from_distances(&dm, 45.0).expect("valid");
        let config = FleetConfig::default().with_vehicles(2);
        let model = RoutingModel::new(&stops, &dm, &tm, &config);

        for strategy in FirstSolutionStrategy::ALL {
            let (_, unplaced) = build_initial(&model, strategy);
            assert_eq!(unplaced, vec![2], "{strategy}");
        }
    }
}
