//! Pairwise stop exchange.
//!
//! # Algorithm
//!
//! Swaps the positions of two stops, either within one route or between
//! two routes. Useful when neither stop can move alone without breaking
//! capacity but a swap keeps both loads within bounds.
//!
//! # Complexity
//!
//! O(n²) moves per neighborhood scan.

use rand::Rng;

use super::{pick_route, Move};

/// Pushes every exchange move.
pub fn enumerate(routes: &[Vec<usize>], out: &mut Vec<Move>) {
    for (route_a, ra) in routes.iter().enumerate() {
        for pos_a in 0..ra.len() {
            for pos_b in (pos_a + 1)..ra.len() {
                out.push(Move::Exchange {
                    route_a,
                    pos_a,
                    route_b: route_a,
                    pos_b,
                });
            }
            for (route_b, rb) in routes.iter().enumerate().skip(route_a + 1) {
                for pos_b in 0..rb.len() {
                    out.push(Move::Exchange {
                        route_a,
                        pos_a,
                        route_b,
                        pos_b,
                    });
                }
            }
        }
    }
}

/// Draws a random exchange move.
pub fn random<R: Rng>(routes: &[Vec<usize>], rng: &mut R) -> Option<Move> {
    let route_a = pick_route(routes, 1, rng)?;
    let route_b = pick_route(routes, 1, rng)?;
    let pos_a = rng.random_range(0..routes[route_a].len());
    let pos_b = rng.random_range(0..routes[route_b].len());
    if route_a == route_b {
        if pos_a == pos_b {
            return None;
        }
        return Some(Move::Exchange {
            route_a,
            pos_a: pos_a.min(pos_b),
            route_b,
            pos_b: pos_a.max(pos_b),
        });
    }
    Some(Move::Exchange {
        route_a,
        pos_a,
        route_b,
        pos_b,
    })
}
