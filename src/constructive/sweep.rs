//! Sweep constructive heuristic.
//!
//! # Algorithm
//!
//! Sorts stops by polar angle around the depot (longitude as x, latitude
//! as y), then fills vehicles sequentially in angular order. A stop that
//! does not fit the current vehicle closes it and opens the next one; a stop
//! that fits no fresh vehicle either is left for repair. This exploits
//! geographic clustering: nearby stops tend to have similar angles and end
//! up on the same route.
//!
//! # Complexity
//!
//! O(n log n) for the angle sort plus O(n) constant-time feasibility checks.
//!
//! # Reference
//!
//! Gillett, B.E. & Miller, L.R. (1974). "A Heuristic Algorithm for the
//! Vehicle-Dispatch Problem", *Operations Research* 22(2), 340-349.

use crate::optimizer::{Routes, RoutingModel};

/// Builds routes by sweeping around the depot.
pub fn sweep(model: &RoutingModel<'_>) -> Routes {
    let eval = model.evaluator();
    let constraints = model.constraints();
    let stops = eval.stops();
    let depot = stops.get(model.depot());

    let mut order: Vec<(usize, f64, f64)> = model
        .customers()
        .into_iter()
        .map(|i| {
            let s = stops.get(i);
            let dx = s.lon() - depot.lon();
            let dy = s.lat() - depot.lat();
            (i, dy.atan2(dx), eval.distances().get(model.depot(), i))
        })
        .collect();
    order.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.total_cmp(&b.2)));

    let mut routes = vec![Vec::new(); model.num_vehicles()];
    if routes.is_empty() {
        return routes;
    }
    let mut current = 0;
    let mut tail = eval.start_tail(constraints);

    for (cid, _, _) in order {
        if let Some(next) = eval.extend(&tail, cid, constraints) {
            routes[current].push(cid);
            tail = next;
            continue;
        }
        if tail.is_empty() || current + 1 == routes.len() {
            continue;
        }
        current += 1;
        tail = eval.start_tail(constraints);
        if let Some(next) = eval.extend(&tail, cid, constraints) {
            routes[current].push(cid);
            tail = next;
        }
    }
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::{DistanceMatrix, TimeMatrix};
    use crate::models::{FleetConfig, Stop, StopSet};

    fn compass() -> StopSet {
        StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("NE", 0.1, 0.1).with_demand(1.0),
            Stop::new("NW", 0.1, -0.1).with_demand(1.0),
            Stop::new("SW", -0.1, -0.1).with_demand(1.0),
            Stop::new("SE", -0.1, 0.1).with_demand(1.0),
        ])
        .expect("valid")
    }

    #[test]
    fn test_sweep_all_one_route() {
        let stops = compass();
        let dm = DistanceMatrix::from_stops(&stops).expect("alloc");
        let tm = TimeMatrix::from_distances(&dm, 45.0).expect("valid");
        let config = FleetConfig::default().with_vehicles(2).with_capacity(10.0);
        let model = RoutingModel::new(&stops, &dm, &tm, &config);

        let routes = sweep(&model);
        // Angles from -pi: SW, SE, NE, NW.
        assert_eq!(routes[0], vec![3, 4, 1, 2]);
        assert!(routes[1].is_empty());
    }

    #[test]
    fn test_sweep_splits_by_capacity() {
        let stops = compass();
        let dm = DistanceMatrix::from_stops(&stops).expect("alloc");
        let tm = TimeMatrix::from_distances(&dm, 45.0).expect("valid");
        let config = FleetConfig::default().with_vehicles(2).with_capacity(2.0);
        let model = RoutingModel::new(&stops, &dm, &tm, &config);

        let routes = sweep(&model);
        assert_eq!(routes, vec![vec![3, 4], vec![1, 2]]);
    }

    #[test]
    fn test_sweep_leaves_overflow_unrouted() {
        let stops = compass();
        let dm = DistanceMatrix::from_stops(&stops).expect("alloc");
        let tm = TimeMatrix::from_distances(&dm, 45.0).expect("valid");
        let config = FleetConfig::default().with_vehicles(1).with_capacity(2.0);
        let model = RoutingModel::new(&stops, &dm, &tm, &config);

        let routes = sweep(&model);
        assert_eq!(routes, vec![vec![3, 4]]);
    }
}
