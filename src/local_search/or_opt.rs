//! Chain relocation between routes.
//!
//! # Algorithm
//!
//! Moves a chain of two or three consecutive stops, in order, from one
//! route to any position of another. Single stops are covered by
//! relocate.
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

/// Chain lengths tried.
pub const CHAIN_LENGTHS: [usize; 2] = [2, 3];

/// Pushes every or-opt move.
pub fn enumerate(routes: &[Vec<usize>], out: &mut Vec<Move>) {
    for (from_route, from) in routes.iter().enumerate() {
        for len in CHAIN_LENGTHS {
            if from.len() < len {
                continue;
            }
            for from_pos in 0..=(from.len() - len) {
                for (to_route, to) in routes.iter().enumerate() {
                    if to_route == from_route || redundant_empty(routes, to_route) {
                        continue;
                    }
                    for to_pos in 0..=to.len() {
                        out.push(Move::OrOpt {
                            from_route,
                            from_pos,
                            len,
                            to_route,
                            to_pos,
                        });
                    }
                }
            }
        }
    }
}

/// Draws a random or-opt move.
pub fn random<R: Rng>(routes: &[Vec<usize>], rng: &mut R) -> Option<Move> {
    if routes.len() < 2 {
        return None;
    }
    let len = CHAIN_LENGTHS[rng.random_range(0..CHAIN_LENGTHS.len())];
    let from_route = pick_route(routes, len, rng)?;
    let from_pos = rng.random_range(0..=(routes[from_route].len() - len));
    let mut to_route = rng.random_range(0..routes.len() - 1);
    if to_route >= from_route {
        to_route += 1;
    }
    let to_pos = rng.random_range(0..=routes[to_route].len());
    Some(Move::OrOpt {
        from_route,
        from_pos,
        len,
        to_route,
        to_pos,
    })
}
