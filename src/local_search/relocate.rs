//! Single-stop relocation.
//!
//! # Algorithm
//!
//! Removes one stop and reinserts it at another position, on the same route
//! or on any other route. Covers both intra-route reordering and load
//! balancing between vehicles.
//!
//! # Complexity
//!
//! O(n²) moves per neighborhood scan.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use rand::Rng;

use super::{pick_route, redundant_empty, Move};

/// Pushes every relocate move.
pub fn enumerate(routes: &[Vec<usize>], out: &mut Vec<Move>) {
    for (from_route, from) in routes.iter().enumerate() {
        for from_pos in 0..from.len() {
            for (to_route, to) in routes.iter().enumerate() {
                if to_route == from_route {
                    for to_pos in (0..from.len()).filter(|&p| p != from_pos) {
                        out.push(Move::Relocate {
                            from_route,
                            from_pos,
                            to_route,
                            to_pos,
                        });
                    }
                    continue;
                }
                if redundant_empty(routes, to_route) {
                    continue;
                }
                for to_pos in 0..=to.len() {
                    out.push(Move::Relocate {
                        from_route,
                        from_pos,
                        to_route,
                        to_pos,
                    });
                }
            }
        }
    }
}

/// Draws a random relocate move.
pub fn random<R: Rng>(routes: &[Vec<usize>], rng: &mut R) -> Option<Move> {
    let from_route = pick_route(routes, 1, rng)?;
    let from_len = routes[from_route].len();
    let from_pos = rng.random_range(0..from_len);
    let to_route = rng.random_range(0..routes.len());
    let to_pos = if to_route == from_route {
        if from_len < 2 {
            return None;
        }
        let p = rng.random_range(0..from_len - 1);
        if p >= from_pos {
            p + 1
        } else {
            p
        }
    } else {
        rng.random_range(0..=routes[to_route].len())
    };
    Some(Move::Relocate {
        from_route,
        from_pos,
        to_route,
        to_pos,
    })
}
