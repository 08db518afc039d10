//! Path-building first-solution strategies.
//!
//! # Algorithm
//!
//! Each vehicle in turn extends its path from the last visited node. A
//! candidate qualifies when appending it keeps the whole route, return leg
//! included, feasible in every dimension. The path closes when nothing
//! qualifies.
//!
//! - *Cheapest arc* picks the qualifying candidate with the lowest arc cost.
//! - *Most constrained arc* picks the candidate with the earliest window
//!   close, then the narrowest window, then the largest demand, and only
//!   then the lowest arc cost.
//!
//! # Complexity
//!
//! O(n² · v) feasibility checks, each O(1).

use std::cmp::Ordering;

use crate::models::Stop;
use crate::optimizer::{Routes, RoutingModel};

/// Builds paths by always taking the cheapest feasible outgoing arc.
///
/// Stops left over when every vehicle is closed are not placed.
pub fn path_cheapest_arc(model: &RoutingModel<'_>) -> Routes {
    build_paths(model, |model, last, a, b| {
        model.arc_cost(last, a).cmp(&model.arc_cost(last, b))
    })
}

/// Builds paths by serving the most constrained stops first.
pub fn path_most_constrained_arc(model: &RoutingModel<'_>) -> Routes {
    build_paths(model, |model, last, a, b| {
        let stops = model.evaluator().stops();
        let (sa, sb) = (stops.get(a), stops.get(b));
        let close = |s: &Stop| s.time_window().latest().unwrap_or(f64::INFINITY);
        let width = |s: &Stop| {
            let tw = s.time_window();
            match (tw.earliest(), tw.latest()) {
                (Some(e), Some(l)) => l - e,
                _ => f64::INFINITY,
            }
        };
        let windows = model.constraints().time.is_some_and(|r| r.enforce_windows());
        let by_window = if windows {
            close(sa)
                .total_cmp(&close(sb))
                .then_with(|| width(sa).total_cmp(&width(sb)))
        } else {
            Ordering::Equal
        };
        by_window
            .then_with(|| sb.demand().total_cmp(&sa.demand()))
            .then_with(|| model.arc_cost(last, a).cmp(&model.arc_cost(last, b)))
    })
}

/// Extends one path per vehicle, choosing among feasible candidates with
/// `prefer`. Earlier candidates win ties.
fn build_paths<F>(model: &RoutingModel<'_>, prefer: F) -> Routes
where
    F: Fn(&RoutingModel<'_>, usize, usize, usize) -> Ordering,
{
    let eval = model.evaluator();
    let constraints = model.constraints();
    let mut unvisited = model.customers();
    let mut routes = vec![Vec::new(); model.num_vehicles()];

    for route in routes.iter_mut() {
        let mut tail = eval.start_tail(constraints);
        loop {
            let mut best: Option<(usize, _)> = None;
            for (k, &c) in unvisited.iter().enumerate() {
                let Some(next) = eval.extend(&tail, c, constraints) else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some((bk, _)) => prefer(model, tail.last(), c, unvisited[bk]) == Ordering::Less,
                };
                if better {
                    best = Some((k, next));
                }
            }
            let Some((k, next)) = best else {
                break;
            };
            route.push(unvisited.remove(k));
            tail = next;
        }
        if unvisited.is_empty() {
            break;
        }
    }
    routes
}
