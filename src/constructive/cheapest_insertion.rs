//! Cheapest insertion across all routes at once.
//!
//! # Algorithm
//!
//! Every unrouted stop keeps, per route, its cheapest feasible insertion
//! position. Each step commits the globally cheapest (stop, route,
//! position) triple; only the route that changed is re-scanned.
//!
//! Used as a first-solution strategy starting from empty routes and as the
//! repair step completing partial constructions.
//!
//! # Complexity
//!
//! O(n² · L) feasibility checks, L being the route length.

use crate::optimizer::{Routes, RoutingModel};

/// Best feasible insertion of one stop into one route.
#[derive(Debug, Clone, Copy)]
struct Insertion {
    delta: i64,
    pos: usize,
}

/// Builds all routes in parallel by repeated cheapest insertion.
pub fn parallel_cheapest_insertion(model: &RoutingModel<'_>) -> Routes {
    let mut routes = vec![Vec::new(); model.num_vehicles()];
    let unrouted = model.customers();
    insert_unrouted(model, &mut routes, unrouted);
    routes
}

/// Inserts `unrouted` stops into `routes` at their cheapest feasible
/// positions. Returns the stops that fit nowhere.
pub fn insert_unrouted(model: &RoutingModel<'_>, routes: &mut Routes, mut unrouted: Vec<usize>) -> Vec<usize> {
    let mut scratch = Vec::new();
    // best[k][r]: cheapest insertion of unrouted[k] into route r.
    let mut best: Vec<Vec<Option<Insertion>>> = unrouted
        .iter()
        .map(|&c| {
            routes
                .iter()
                .map(|route| best_insertion(model, route, c, &mut scratch))
                .collect()
        })
        .collect();

    loop {
        let mut choice: Option<(usize, usize, Insertion)> = None;
        for (k, per_route) in best.iter().enumerate() {
            for (r, ins) in per_route.iter().enumerate() {
                let Some(ins) = ins else { continue };
                if choice.is_none_or(|(_, _, b)| ins.delta < b.delta) {
                    choice = Some((k, r, *ins));
                }
            }
        }
        let Some((k, r, ins)) = choice else {
            break;
        };

        let customer = unrouted.swap_remove(k);
        best.swap_remove(k);
        routes[r].insert(ins.pos, customer);

        for (k, per_route) in best.iter_mut().enumerate() {
            per_route[r] = best_insertion(model, &routes[r], unrouted[k], &mut scratch);
        }
    }

    unrouted.sort_unstable();
    unrouted
}

fn best_insertion(
    model: &RoutingModel<'_>,
    route: &[usize],
    customer: usize,
    scratch: &mut Vec<usize>,
) -> Option<Insertion> {
    let mut candidates: Vec<Insertion> = (0..=route.len())
        .map(|pos| Insertion {
            delta: model.insertion_delta(route, pos, customer),
            pos,
        })
        .collect();
    candidates.sort_by_key(|c| (c.delta, c.pos));
    candidates
        .into_iter()
        .find(|c| model.insertion_feasible(route, c.pos, customer, scratch))
}
