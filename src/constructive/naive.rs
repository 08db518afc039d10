//! Nearest-feasible-neighbor baseline.
//!
//! # Algorithm
//!
//! Vehicles are filled one after another. Each starts at the depot at
//! opening time with an empty load and repeatedly moves to the closest
//! unvisited stop it can still serve: the demand must fit the remaining
//! capacity, the service must start (after any wait) before the stop's
//! window closes, and the vehicle must be able to return to the depot before
//! closing and within the duration cap. Ties go to the stop listed first.
//! When no stop qualifies the vehicle returns and the next one starts.
//!
//! Selection uses raw distance only, with no lookahead. This models routes
//! a dispatcher would draw by hand and serves as the comparison point for
//! the optimizer.
//!
//! # Complexity
//!
//! O(n² · v) for n stops and v vehicles.

use tracing::{debug, warn};

use crate::distance::{DistanceMatrix, TimeMatrix};
use crate::evaluation::{Constraints, RouteEvaluator};
use crate::models::{FleetConfig, Infeasibility, Outcome, Solution, StopSet};

/// Builds a baseline solution by nearest-feasible-neighbor expansion.
///
/// Stops that no vehicle can serve are left out of the routes and listed in
/// [`Solution::unassigned`]; this is not an error.
///
/// # Arguments
///
/// * `stops`: Validated stop table
/// * `distances`: Distance matrix (km)
/// * `times`: Travel time matrix (minutes)
/// * `config`: Fleet size, capacity, and time limits
///
/// # Examples
///
/// ```
/// use u_lastmile::models::{FleetConfig, Stop, StopSet};
/// use u_lastmile::distance::{DistanceMatrix, TimeMatrix};
/// use u_lastmile::constructive::nearest_feasible;
///
/// let stops = StopSet::new(vec![
///     Stop::depot("D", 0.0, 0.0),
///     Stop::new("A", 0.0, 1.0),
///     Stop::new("B", 0.0, 2.0),
/// ]).unwrap();
/// let dm = DistanceMatrix::from_stops(&stops).unwrap();
/// let tm = TimeMatrix::from_distances(&dm, 60.0).unwrap();
/// let config = FleetConfig::default().with_vehicles(1).without_max_route_hours();
///
/// let outcome = nearest_feasible(&stops, &dm, &tm, &config);
/// let solution = outcome.solution().unwrap();
/// assert_eq!(solution.routes()[0].stops(), &[0, 1, 2, 0]);
/// ```
pub fn nearest_feasible(
    stops: &StopSet,
    distances: &DistanceMatrix,
    times: &TimeMatrix,
    config: &FleetConfig,
) -> Outcome {
    if stops.len() < 2 {
        return Outcome::Infeasible(Infeasibility::not_enough_stops());
    }
    if config.num_vehicles < 1 {
        return Outcome::Infeasible(Infeasibility::no_vehicles());
    }

    let eval = RouteEvaluator::new(stops, distances, times);
    let constraints = Constraints::from_config(config, stops);
    let depot = stops.depot();
    let mut unvisited: Vec<usize> = stops.customers().collect();
    let mut routes = Vec::new();

    for vehicle_id in 0..config.num_vehicles {
        if unvisited.is_empty() {
            break;
        }

        let mut route = Vec::new();
        let mut current = depot;
        let mut load = 0.0;
        let mut clock = config.depot_window.open;

        loop {
            let departure_to = |next: usize| -> Option<f64> {
                let stop = stops.get(next);
                if constraints.capacity.is_some_and(|c| load + stop.demand() > c) {
                    return None;
                }
                let Some(rules) = &constraints.time else {
                    return Some(clock);
                };
                let mut arrival = clock + times.get(current, next);
                if rules.enforce_windows() {
                    let tw = stop.time_window();
                    arrival += tw.waiting_time(arrival);
                    if tw.is_violated(arrival) {
                        return None;
                    }
                }
                let departure = arrival + stop.service_minutes();

                let window = rules.depot_window();
                let back = departure + times.get(next, depot);
                if back > window.close || rules.max_duration().is_some_and(|m| back - window.open > m) {
                    return None;
                }
                Some(departure)
            };

            let feasible: Vec<usize> = unvisited
                .iter()
                .copied()
                .filter(|&next| departure_to(next).is_some())
                .collect();
            let Some(next) = distances.nearest_neighbor(current, &feasible) else {
                break;
            };
            let (Some(departure), Some(k)) = (departure_to(next), unvisited.iter().position(|&s| s == next)) else {
                break;
            };
            unvisited.remove(k);
            load += stops.get(next).demand();
            clock = departure;
            current = next;
            route.push(next);
        }

        if !route.is_empty() {
            debug!(vehicle_id, stops = route.len(), "closed baseline route");
            routes.push(eval.build_route(vehicle_id, &route));
        }
    }

    if !unvisited.is_empty() {
        warn!(
            unassigned = unvisited.len(),
            "baseline could not place every stop"
        );
    }
    Outcome::Solved(Solution::new(routes, unvisited))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DepotWindow, Stop};
    use proptest::prelude::*;

    fn solve(stops: &StopSet, config: &FleetConfig) -> Outcome {
        let dm = DistanceMatrix::from_stops(stops).expect("alloc");
        let tm = TimeMatrix::from_distances(&dm, config.speed_kmh).expect("valid");
        nearest_feasible(stops, &dm, &tm, config)
    }

    fn line() -> StopSet {
        StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 1.0),
            Stop::new("B", 0.0, 2.0),
        ])
        .expect("valid")
    }

    #[test]
    fn test_line_single_route() {
        let stops = line();
        let config = FleetConfig::default()
            .with_vehicles(1)
            .with_speed(60.0)
            .without_max_route_hours();
        let sol = solve(&stops, &config).into_solution().expect("solved");
        assert_eq!(sol.vehicles_used(), 1);
        assert_eq!(sol.routes()[0].stops(), &[0, 1, 2, 0]);

        let dm = DistanceMatrix::from_stops(&stops).expect("alloc");
        let expected = dm.get(0, 1) + dm.get(1, 2) + dm.get(2, 0);
        assert!((sol.total_distance() - expected).abs() < 1e-9);
        assert!((sol.total_distance() - 2.0 * dm.get(0, 2)).abs() < 1e-3);
        assert!(sol.is_complete());
    }

    #[test]
    fn test_capacity_splits_routes() {
        let stops = StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 0.1).with_demand(3.0),
            Stop::new("B", 0.0, 0.2).with_demand(3.0),
        ])
        .expect("valid");
        let config = FleetConfig::default().with_vehicles(2).with_capacity(5.0);
        let sol = solve(&stops, &config).into_solution().expect("solved");
        assert_eq!(sol.vehicles_used(), 2);
        for route in sol.routes() {
            assert!(route.demand() <= 5.0);
            assert_eq!(route.num_stops(), 1);
        }
    }

    #[test]
    fn test_one_vehicle_leaves_stop_unassigned() {
        let stops = StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 0.1).with_demand(3.0),
            Stop::new("B", 0.0, 0.2).with_demand(3.0),
        ])
        .expect("valid");
        let config = FleetConfig::default().with_vehicles(1).with_capacity(5.0);
        let sol = solve(&stops, &config).into_solution().expect("solved");
        assert_eq!(sol.num_served(), 1);
        assert_eq!(sol.unassigned(), &[2]);
        assert!(!sol.is_complete());
    }

    #[test]
    fn test_unreachable_window_skipped() {
        let stops = StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 0.1),
            Stop::new("B", 0.0, 1.0).with_time_window(None, Some(490.0)),
        ])
        .expect("valid");
        let config = FleetConfig::default().with_vehicles(2);
        let sol = solve(&stops, &config).into_solution().expect("solved");
        assert_eq!(sol.unassigned(), &[2]);
        assert_eq!(sol.vehicles_used(), 1);
    }

    #[test]
    fn test_waits_for_window() {
        let stops = StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 0.1).with_time_window(Some(900.0), Some(960.0)),
            Stop::new("B", 0.0, 0.2).with_time_window(Some(600.0), Some(930.0)),
        ])
        .expect("valid");
        let config = FleetConfig::default().with_vehicles(1).without_max_route_hours();
        let sol = solve(&stops, &config).into_solution().expect("solved");
        // A is closer, so it is visited first at 15:00; B then closes at 15:30.
        assert_eq!(sol.routes()[0].stops(), &[0, 1, 2, 0]);
    }

    #[test]
    fn test_depot_closing_respected() {
        let stops = line();
        let config = FleetConfig::default()
            .with_vehicles(2)
            .with_speed(60.0)
            .without_max_route_hours()
            .with_depot_window(DepotWindow {
                open: 480.0,
                close: 480.0 + 300.0,
            });
        // Round trip to B alone takes about 445 minutes.
        let outcome = solve(&stops, &config);
        let sol = outcome.solution().expect("solved");
        // Time rules are inactive without windows or a duration cap.
        assert!(sol.is_complete());

        let capped = config.with_max_route_hours(24.0);
        let sol = solve(&stops, &capped).into_solution().expect("solved");
        assert_eq!(sol.unassigned(), &[2]);
    }

    #[test]
    fn test_no_vehicles() {
        let config = FleetConfig::default().with_vehicles(0);
        let outcome = solve(&line(), &config);
        assert_eq!(outcome.infeasibility(), Some(&Infeasibility::no_vehicles()));
    }

    #[test]
    fn test_totals_sum_routes() {
        let stops = StopSet::new(vec![
            Stop::depot("D", 42.36, -71.06),
            Stop::new("A", 42.40, -71.10).with_demand(2.0).with_service_minutes(10.0),
            Stop::new("B", 42.30, -71.00).with_demand(4.0).with_service_minutes(5.0),
            Stop::new("C", 42.45, -70.95).with_demand(3.0),
            Stop::new("E", 42.33, -71.12).with_demand(2.0),
        ])
        .expect("valid");
        let config = FleetConfig::default().with_vehicles(3).with_capacity(6.0);
        let sol = solve(&stops, &config).into_solution().expect("solved");
        let d: f64 = sol.routes().iter().map(|r| r.distance()).sum();
        let t: f64 = sol.routes().iter().map(|r| r.time()).sum();
        assert_eq!(d, sol.total_distance());
        assert_eq!(t, sol.total_time());
        assert_eq!(sol.num_served() + sol.unassigned().len(), 4);
    }

    #[test]
    fn test_ties_go_to_first_listed() {
        let stops = StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("East", 0.0, 0.1),
            Stop::new("West", 0.0, -0.1),
        ])
        .expect("valid");
        let config = FleetConfig::default().with_vehicles(1);
        let sol = solve(&stops, &config).into_solution().expect("solved");
        assert_eq!(sol.routes()[0].stops(), &[0, 1, 2, 0]);
    }

    fn arb_stops() -> impl Strategy<Value = StopSet> {
        proptest::collection::vec(
            (
                -0.3f64..0.3,
                -0.3f64..0.3,
                0u32..5,
                proptest::option::of((480u32..900, 20u32..240)),
            ),
            2..12,
        )
        .prop_map(|rows| {
            let mut stops = vec![Stop::depot("D", 0.0, 0.0)];
            for (k, (lat, lon, demand, window)) in rows.into_iter().enumerate() {
                let mut s = Stop::new(format!("S{k}"), lat, lon)
                    .with_demand(f64::from(demand))
                    .with_service_minutes(10.0);
                if let Some((start, len)) = window {
                    s = s.with_time_window(Some(f64::from(start)), Some(f64::from(start + len)));
                }
                stops.push(s);
            }
            StopSet::new(stops).expect("valid")
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_baseline_routes_are_feasible(
            stops in arb_stops(),
            vehicles in 1usize..4,
            capacity in 4.0f64..15.0,
        ) {
            let config = FleetConfig::default().with_vehicles(vehicles).with_capacity(capacity);
            let dm = DistanceMatrix::from_stops(&stops).expect("alloc");
            let tm = TimeMatrix::from_distances(&dm, config.speed_kmh).expect("valid");
            let sol = nearest_feasible(&stops, &dm, &tm, &config)
                .into_solution()
                .expect("solved");

            prop_assert_eq!(sol.num_served() + sol.unassigned().len(), stops.num_customers());
            prop_assert!(sol.routes().len() <= vehicles);

            let mut seen = vec![false; stops.len()];
            for &u in sol.unassigned() {
                seen[u] = true;
            }
            let eval = RouteEvaluator::new(&stops, &dm, &tm);
            let rules = Constraints::from_config(&config, &stops).time.expect("duration cap set");
            for route in sol.routes() {
                prop_assert_eq!(route.stops().first(), Some(&stops.depot()));
                prop_assert_eq!(route.stops().last(), Some(&stops.depot()));
                for &c in route.customers() {
                    prop_assert!(c != stops.depot());
                    prop_assert!(!seen[c]);
                    seen[c] = true;
                }
                prop_assert!(route.demand() <= capacity);

                // Departing at opening time reproduces the baseline's clock.
                let (visits, profile) = eval.schedule(route.customers(), &rules);
                prop_assert!(profile.is_ok());
                for v in visits {
                    let tw = stops.get(v.stop).time_window();
                    prop_assert!(tw.earliest().is_none_or(|e| v.start >= e - 1e-9));
                    prop_assert!(tw.latest().is_none_or(|l| v.start <= l + 1e-9));
                }
            }
            prop_assert!(seen.iter().skip(1).all(|&s| s));
        }
    }
}
