//! Inter-route 2-opt*.
//!
//! # Algorithm
//!
//! Cuts two routes and reconnects the head of each to the tail of the
//! other, preserving the direction of both tails. Effective at untangling
//! routes that cross each other.
//!
//! # Complexity
//!
//! O(n²) moves per neighborhood scan.
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An Exchange Heuristic for
//! Routeing Problems with Time Windows", *Journal of the Operational
//! Research Society* 46(12), 1433-1446.

use rand::Rng;

use super::{pick_route, redundant_empty, Move};

/// Pushes every 2-opt* move that changes both routes.
pub fn enumerate(routes: &[Vec<usize>], out: &mut Vec<Move>) {
    for (route_a, ra) in routes.iter().enumerate() {
        if ra.is_empty() {
            continue;
        }
        for (route_b, rb) in routes.iter().enumerate().skip(route_a + 1) {
            if redundant_empty(routes, route_b) {
                continue;
            }
            for cut_a in 0..=ra.len() {
                for cut_b in 0..=rb.len() {
                    if is_trivial(ra.len(), cut_a, rb.len(), cut_b) {
                        continue;
                    }
                    out.push(Move::TwoOptStar {
                        route_a,
                        cut_a,
                        route_b,
                        cut_b,
                    });
                }
            }
        }
    }
}

/// Cutting both routes at the same end only swaps whole routes.
fn is_trivial(len_a: usize, cut_a: usize, len_b: usize, cut_b: usize) -> bool {
    (cut_a == 0 && cut_b == 0) || (cut_a == len_a && cut_b == len_b)
}

/// Draws a random 2-opt* move.
pub fn random<R: Rng>(routes: &[Vec<usize>], rng: &mut R) -> Option<Move> {
    if routes.len() < 2 {
        return None;
    }
    let route_a = pick_route(routes, 1, rng)?;
    let mut route_b = rng.random_range(0..routes.len() - 1);
    if route_b >= route_a {
        route_b += 1;
    }
    let cut_a = rng.random_range(0..=routes[route_a].len());
    let cut_b = rng.random_range(0..=routes[route_b].len());
    if is_trivial(routes[route_a].len(), cut_a, routes[route_b].len(), cut_b) {
        return None;
    }
    Some(Move::TwoOptStar {
        route_a,
        cut_a,
        route_b,
        cut_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerate_excludes_trivial_cuts() {
        let routes = vec![vec![1], vec![2]];
        let mut moves = Vec::new();
        enumerate(&routes, &mut moves);
        // Cuts (0,1) and (1,0) remain out of four.
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_tail_into_empty_route() {
        let routes = vec![vec![1, 2, 3], vec![]];
        let mv = Move::TwoOptStar {
            route_a: 0,
            cut_a: 1,
            route_b: 1,
            cut_b: 0,
        };
        assert_eq!(mv.preview(&routes), (vec![1], Some(vec![2, 3])));
    }
}
