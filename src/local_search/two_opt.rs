//! Intra-route 2-opt.
//!
//! # Algorithm
//!
//! Removes two arcs of a route and reconnects it by reversing the segment
//! between them, eliminating crossings.
//!
//! # Complexity
//!
//! O(n²) moves per neighborhood scan; each delta costs O(segment) so that
//! asymmetric costs are priced exactly.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A Method for Solving Traveling-Salesman Problems",
//! *Operations Research* 6(6), 791-812.

use rand::Rng;

use super::{pick_route, Move};

/// Pushes every 2-opt move.
pub fn enumerate(routes: &[Vec<usize>], out: &mut Vec<Move>) {
    for (route, r) in routes.iter().enumerate() {
        for i in 0..r.len() {
            for j in (i + 1)..r.len() {
                out.push(Move::TwoOpt { route, i, j });
            }
        }
    }
}

/// Draws a random 2-opt move.
pub fn random<R: Rng>(routes: &[Vec<usize>], rng: &mut R) -> Option<Move> {
    let route = pick_route(routes, 2, rng)?;
    let len = routes[route].len();
    let i = rng.random_range(0..len - 1);
    let j = rng.random_range(i + 1..len);
    Some(Move::TwoOpt { route, i, j })
}
