//! Clarke-Wright savings algorithm.
//!
//! # Algorithm
//!
//! The savings algorithm (Clarke & Wright, 1964) starts with each stop on
//! its own route (depot → stop → depot). It then merges routes by
//! computing the "savings" of joining the end of one route to the start of
//! another:
//!
//! ```text
//! s(i, j) = c(0, i) + c(j, 0) - c(i, j)
//! ```
//!
//! Routes are merged in decreasing order of savings while the merged route
//! stays feasible in every dimension. When more routes remain than vehicles
//! exist, the largest routes are kept and the rest are left for repair.
//!
//! # Complexity
//!
//! O(n² log n) for the savings list plus one O(L) feasibility check per
//! candidate merge.
//!
//! # Reference
//!
//! Clarke, G. & Wright, J.W. (1964). "Scheduling of Vehicles from a Central
//! Depot to a Number of Delivery Points", *Operations Research* 12(4), 568-581.

use std::cmp::Reverse;

use crate::optimizer::{Routes, RoutingModel};

#[derive(Debug)]
struct Saving {
    i: usize,
    j: usize,
    value: i64,
}

/// Builds routes with the savings algorithm, capped at the fleet size.
pub fn savings(model: &RoutingModel<'_>) -> Routes {
    let depot = model.depot();
    let customers = model.customers();
    let n = model.num_nodes();

    let mut list = Vec::with_capacity(customers.len() * customers.len().saturating_sub(1));
    for &i in &customers {
        for &j in &customers {
            if i == j {
                continue;
            }
            let value = model.arc_cost(i, depot) + model.arc_cost(depot, j) - model.arc_cost(i, j);
            if value > 0 {
                list.push(Saving { i, j, value });
            }
        }
    }
    list.sort_by_key(|s| (Reverse(s.value), s.i, s.j));

    // route_of[stop] indexes into members; singleton routes are infeasible
    // stops and stay unrouted.
    let mut route_of: Vec<Option<usize>> = vec![None; n];
    let mut members: Vec<Vec<usize>> = Vec::with_capacity(customers.len());
    for &c in &customers {
        if model.is_feasible(&[c]) {
            route_of[c] = Some(members.len());
            members.push(vec![c]);
        }
    }

    let mut merged = Vec::new();
    for s in &list {
        let (Some(ri), Some(rj)) = (route_of[s.i], route_of[s.j]) else {
            continue;
        };
        if ri == rj || members[ri].last() != Some(&s.i) || members[rj].first() != Some(&s.j) {
            continue;
        }

        merged.clear();
        merged.extend_from_slice(&members[ri]);
        merged.extend_from_slice(&members[rj]);
        if !model.is_feasible(&merged) {
            continue;
        }

        let from = std::mem::take(&mut members[rj]);
        for &c in &from {
            route_of[c] = Some(ri);
        }
        members[ri].extend(from);
    }

    let mut routes: Routes = members.into_iter().filter(|m| !m.is_empty()).collect();
    routes.sort_by_key(|r| (Reverse(r.len()), model.route_cost(r)));
    routes.truncate(model.num_vehicles());
    routes.resize(model.num_vehicles(), Vec::new());
    routes
}
