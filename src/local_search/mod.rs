//! Local search operators for improving routes.
//!
//! - [`relocate`]: Move one stop to another position, on any route
//! - [`exchange`]: Swap two stops, on the same or different routes
//! - [`two_opt`]: Intra-route segment reversal
//! - [`or_opt`]: Move a chain of two or three stops to another route
//! - [`two_opt_star`]: Exchange the tails of two routes
//!
//! Moves are constraint-agnostic: [`Move::delta`] prices a move from the
//! arcs it adds and removes, and [`Move::preview`] builds the changed routes
//! so the caller can check them against its dimensions before applying.

pub mod exchange;
pub mod or_opt;
pub mod relocate;
pub mod two_opt;
pub mod two_opt_star;

use rand::Rng;

/// A neighborhood move over per-vehicle customer sequences.
///
/// Positions index the customer sequences; the depot is implied at both
/// ends of every route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Remove the stop at `from_pos` and insert it at `to_pos`. On the same
    /// route, `to_pos` indexes the sequence after removal.
    Relocate {
        /// Source route.
        from_route: usize,
        /// Source position.
        from_pos: usize,
        /// Target route.
        to_route: usize,
        /// Target position.
        to_pos: usize,
    },
    /// Swap two stops. On the same route, `pos_a < pos_b`.
    Exchange {
        /// First route.
        route_a: usize,
        /// First position.
        pos_a: usize,
        /// Second route.
        route_b: usize,
        /// Second position.
        pos_b: usize,
    },
    /// Reverse the segment `i..=j` of one route.
    TwoOpt {
        /// Route.
        route: usize,
        /// Segment start.
        i: usize,
        /// Segment end (inclusive).
        j: usize,
    },
    /// Move `len` consecutive stops to another route, keeping their order.
    OrOpt {
        /// Source route.
        from_route: usize,
        /// First position of the chain.
        from_pos: usize,
        /// Chain length.
        len: usize,
        /// Target route.
        to_route: usize,
        /// Insertion position in the target.
        to_pos: usize,
    },
    /// Cut both routes and exchange their tails:
    /// `a[..cut_a] + b[cut_b..]` and `b[..cut_b] + a[cut_a..]`.
    TwoOptStar {
        /// First route.
        route_a: usize,
        /// Cut in the first route.
        cut_a: usize,
        /// Second route.
        route_b: usize,
        /// Cut in the second route.
        cut_b: usize,
    },
}

/// Node before position `pos`, or the depot.
#[inline]
fn before(route: &[usize], pos: usize, depot: usize) -> usize {
    if pos == 0 {
        depot
    } else {
        route[pos - 1]
    }
}

/// Node at position `pos`, or the depot past the end.
#[inline]
fn at(route: &[usize], pos: usize, depot: usize) -> usize {
    route.get(pos).copied().unwrap_or(depot)
}

impl Move {
    /// Cost change of the move under the arc cost function `cost`.
    pub fn delta<F>(&self, routes: &[Vec<usize>], depot: usize, cost: &F) -> i64
    where
        F: Fn(usize, usize) -> i64,
    {
        match *self {
            Move::Relocate {
                from_route,
                from_pos,
                to_route,
                to_pos,
            } => {
                let r = &routes[from_route];
                let x = r[from_pos];
                let a = before(r, from_pos, depot);
                let b = at(r, from_pos + 1, depot);
                let removal = cost(a, b) - cost(a, x) - cost(x, b);

                let (u, v) = if from_route == to_route {
                    // Positions in the sequence with `x` removed.
                    let reduced = |k: usize| if k < from_pos { r[k] } else { r[k + 1] };
                    let u = if to_pos == 0 { depot } else { reduced(to_pos - 1) };
                    let v = if to_pos < r.len() - 1 { reduced(to_pos) } else { depot };
                    (u, v)
                } else {
                    let t = &routes[to_route];
                    (before(t, to_pos, depot), at(t, to_pos, depot))
                };
                removal + cost(u, x) + cost(x, v) - cost(u, v)
            }
            Move::Exchange {
                route_a,
                pos_a,
                route_b,
                pos_b,
            } => {
                let ra = &routes[route_a];
                let rb = &routes[route_b];
                let x = ra[pos_a];
                let y = rb[pos_b];
                if route_a == route_b && pos_b == pos_a + 1 {
                    let a = before(ra, pos_a, depot);
                    let b = at(ra, pos_b + 1, depot);
                    return cost(a, y) + cost(y, x) + cost(x, b) - cost(a, x) - cost(x, y) - cost(y, b);
                }
                let (a1, b1) = (before(ra, pos_a, depot), at(ra, pos_a + 1, depot));
                let (a2, b2) = (before(rb, pos_b, depot), at(rb, pos_b + 1, depot));
                cost(a1, y) + cost(y, b1) - cost(a1, x) - cost(x, b1) + cost(a2, x) + cost(x, b2)
                    - cost(a2, y)
                    - cost(y, b2)
            }
            Move::TwoOpt { route, i, j } => {
                let r = &routes[route];
                let a = before(r, i, depot);
                let b = at(r, j + 1, depot);
                let mut delta = cost(a, r[j]) + cost(r[i], b) - cost(a, r[i]) - cost(r[j], b);
                for k in i..j {
                    delta += cost(r[k + 1], r[k]) - cost(r[k], r[k + 1]);
                }
                delta
            }
            Move::OrOpt {
                from_route,
                from_pos,
                len,
                to_route,
                to_pos,
            } => {
                let r = &routes[from_route];
                let first = r[from_pos];
                let last = r[from_pos + len - 1];
                let a = before(r, from_pos, depot);
                let b = at(r, from_pos + len, depot);
                let t = &routes[to_route];
                let (u, v) = (before(t, to_pos, depot), at(t, to_pos, depot));
                cost(a, b) - cost(a, first) - cost(last, b) + cost(u, first) + cost(last, v) - cost(u, v)
            }
            Move::TwoOptStar {
                route_a,
                cut_a,
                route_b,
                cut_b,
            } => {
                let ra = &routes[route_a];
                let rb = &routes[route_b];
                let (a1, x1) = (before(ra, cut_a, depot), at(ra, cut_a, depot));
                let (a2, x2) = (before(rb, cut_b, depot), at(rb, cut_b, depot));
                cost(a1, x2) + cost(a2, x1) - cost(a1, x1) - cost(a2, x2)
            }
        }
    }

    /// Routes changed by the move.
    pub fn routes(&self) -> (usize, Option<usize>) {
        let (a, b) = match *self {
            Move::Relocate {
                from_route,
                to_route,
                ..
            }
            | Move::OrOpt {
                from_route,
                to_route,
                ..
            } => (from_route, to_route),
            Move::Exchange {
                route_a, route_b, ..
            }
            | Move::TwoOptStar {
                route_a, route_b, ..
            } => (route_a, route_b),
            Move::TwoOpt { route, .. } => (route, route),
        };
        (a, (a != b).then_some(b))
    }

    /// Stops whose position the move changes.
    pub fn moved_stops(&self, routes: &[Vec<usize>]) -> Vec<usize> {
        match *self {
            Move::Relocate {
                from_route,
                from_pos,
                ..
            } => vec![routes[from_route][from_pos]],
            Move::Exchange {
                route_a,
                pos_a,
                route_b,
                pos_b,
            } => vec![routes[route_a][pos_a], routes[route_b][pos_b]],
            Move::TwoOpt { route, i, j } => routes[route][i..=j].to_vec(),
            Move::OrOpt {
                from_route,
                from_pos,
                len,
                ..
            } => routes[from_route][from_pos..from_pos + len].to_vec(),
            Move::TwoOptStar {
                route_a,
                cut_a,
                route_b,
                cut_b,
            } => {
                let mut out = routes[route_a][cut_a..].to_vec();
                out.extend_from_slice(&routes[route_b][cut_b..]);
                out
            }
        }
    }

    /// New contents of the changed routes, in the order of [`Move::routes`].
    pub fn preview(&self, routes: &[Vec<usize>]) -> (Vec<usize>, Option<Vec<usize>>) {
        match *self {
            Move::Relocate {
                from_route,
                from_pos,
                to_route,
                to_pos,
            } => {
                let mut from = routes[from_route].clone();
                let x = from.remove(from_pos);
                if from_route == to_route {
                    from.insert(to_pos, x);
                    return (from, None);
                }
                let mut to = routes[to_route].clone();
                to.insert(to_pos, x);
                (from, Some(to))
            }
            Move::Exchange {
                route_a,
                pos_a,
                route_b,
                pos_b,
            } => {
                if route_a == route_b {
                    let mut r = routes[route_a].clone();
                    r.swap(pos_a, pos_b);
                    return (r, None);
                }
                let mut a = routes[route_a].clone();
                let mut b = routes[route_b].clone();
                std::mem::swap(&mut a[pos_a], &mut b[pos_b]);
                (a, Some(b))
            }
            Move::TwoOpt { route, i, j } => {
                let mut r = routes[route].clone();
                r[i..=j].reverse();
                (r, None)
            }
            Move::OrOpt {
                from_route,
                from_pos,
                len,
                to_route,
                to_pos,
            } => {
                let mut from = routes[from_route].clone();
                let chain: Vec<usize> = from.drain(from_pos..from_pos + len).collect();
                let mut to = routes[to_route].clone();
                to.splice(to_pos..to_pos, chain);
                (from, Some(to))
            }
            Move::TwoOptStar {
                route_a,
                cut_a,
                route_b,
                cut_b,
            } => {
                let (ra, rb) = (&routes[route_a], &routes[route_b]);
                let mut a = ra[..cut_a].to_vec();
                a.extend_from_slice(&rb[cut_b..]);
                let mut b = rb[..cut_b].to_vec();
                b.extend_from_slice(&ra[cut_a..]);
                (a, Some(b))
            }
        }
    }

    /// Applies the move.
    pub fn apply(&self, routes: &mut [Vec<usize>]) {
        let (first, second) = self.preview(routes);
        let (ra, rb) = self.routes();
        routes[ra] = first;
        if let (Some(rb), Some(second)) = (rb, second) {
            routes[rb] = second;
        }
    }
}

/// The neighborhoods explored by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// [`relocate`]
    Relocate,
    /// [`exchange`]
    Exchange,
    /// [`two_opt`]
    TwoOpt,
    /// [`or_opt`]
    OrOpt,
    /// [`two_opt_star`]
    TwoOptStar,
}

impl Neighborhood {
    /// All neighborhoods.
    pub const ALL: [Self; 5] = [
        Self::Relocate,
        Self::Exchange,
        Self::TwoOpt,
        Self::OrOpt,
        Self::TwoOptStar,
    ];

    /// Pushes every move of this neighborhood.
    pub fn enumerate(&self, routes: &[Vec<usize>], out: &mut Vec<Move>) {
        match self {
            Self::Relocate => relocate::enumerate(routes, out),
            Self::Exchange => exchange::enumerate(routes, out),
            Self::TwoOpt => two_opt::enumerate(routes, out),
            Self::OrOpt => or_opt::enumerate(routes, out),
            Self::TwoOptStar => two_opt_star::enumerate(routes, out),
        }
    }

    /// Draws one move uniformly from the neighborhood's parameter space.
    pub fn random<R: Rng>(&self, routes: &[Vec<usize>], rng: &mut R) -> Option<Move> {
        match self {
            Self::Relocate => relocate::random(routes, rng),
            Self::Exchange => exchange::random(routes, rng),
            Self::TwoOpt => two_opt::random(routes, rng),
            Self::OrOpt => or_opt::random(routes, rng),
            Self::TwoOptStar => two_opt_star::random(routes, rng),
        }
    }
}

/// Returns `true` if `route` is empty but not the first empty route.
/// Moves into interchangeable empty routes are enumerated once.
fn redundant_empty(routes: &[Vec<usize>], route: usize) -> bool {
    routes[route].is_empty() && routes.iter().position(Vec::is_empty) != Some(route)
}

/// Pushes every move of every neighborhood.
pub fn enumerate_all(routes: &[Vec<usize>], out: &mut Vec<Move>) {
    for n in Neighborhood::ALL {
        n.enumerate(routes, out);
    }
}

/// Picks a random route holding at least `min_len` stops.
fn pick_route<R: Rng>(routes: &[Vec<usize>], min_len: usize, rng: &mut R) -> Option<usize> {
    let eligible: Vec<usize> = (0..routes.len()).filter(|&r| routes[r].len() >= min_len).collect();
    if eligible.is_empty() {
        return None;
    }
    Some(eligible[rng.random_range(0..eligible.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DEPOT: usize = 0;

    /// Deterministic asymmetric costs between small integer nodes.
    fn cost(i: usize, j: usize) -> i64 {
        ((i * 7 + j * 13) % 17) as i64 + (i as i64 - j as i64).abs() * 3
    }

    fn total(routes: &[Vec<usize>]) -> i64 {
        routes
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| {
                let mut prev = DEPOT;
                let mut c = 0;
                for &x in r {
                    c += cost(prev, x);
                    prev = x;
                }
                c + cost(prev, DEPOT)
            })
            .sum()
    }

    fn split(perm: Vec<usize>, cuts: &[usize]) -> Vec<Vec<usize>> {
        let mut routes = Vec::new();
        let mut start = 0;
        for &c in cuts {
            let end = (start + c).min(perm.len());
            routes.push(perm[start..end].to_vec());
            start = end;
        }
        routes.push(perm[start..].to_vec());
        routes
    }

    #[test]
    fn test_relocate_same_route() {
        let routes = vec![vec![1, 2, 3, 4]];
        let mv = Move::Relocate {
            from_route: 0,
            from_pos: 0,
            to_route: 0,
            to_pos: 3,
        };
        assert_eq!(mv.preview(&routes).0, vec![2, 3, 4, 1]);
        let mut after = routes.clone();
        mv.apply(&mut after);
        assert_eq!(mv.delta(&routes, DEPOT, &cost), total(&after) - total(&routes));
    }

    #[test]
    fn test_two_opt_star_preview() {
        let routes = vec![vec![1, 2, 3], vec![4, 5]];
        let mv = Move::TwoOptStar {
            route_a: 0,
            cut_a: 1,
            route_b: 1,
            cut_b: 2,
        };
        assert_eq!(mv.preview(&routes), (vec![1], Some(vec![4, 5, 2, 3])));
        assert_eq!(mv.routes(), (0, Some(1)));
        assert_eq!(mv.moved_stops(&routes), vec![2, 3]);
    }

    #[test]
    fn test_or_opt_preview() {
        let routes = vec![vec![1, 2, 3, 4], vec![5]];
        let mv = Move::OrOpt {
            from_route: 0,
            from_pos: 1,
            len: 2,
            to_route: 1,
            to_pos: 1,
        };
        assert_eq!(mv.preview(&routes), (vec![1, 4], Some(vec![5, 2, 3])));
    }

    #[test]
    fn test_random_moves_valid() {
        let routes = vec![vec![1, 2, 3], vec![], vec![4, 5, 6, 7]];
        let mut rng = StdRng::seed_from_u64(7);
        for n in Neighborhood::ALL {
            for _ in 0..50 {
                if let Some(mv) = n.random(&routes, &mut rng) {
                    let mut after = routes.clone();
                    mv.apply(&mut after);
                    let mut all: Vec<usize> = after.iter().flatten().copied().collect();
                    all.sort_unstable();
                    assert_eq!(all, (1..=7).collect::<Vec<_>>(), "{n:?} {mv:?}");
                }
            }
        }
    }

    proptest! {
        #[test]
        fn prop_delta_matches_cost_difference(
            perm in Just((1..=9).collect::<Vec<usize>>()).prop_shuffle(),
            cuts in proptest::collection::vec(0usize..5, 1..4),
        ) {
            let routes = split(perm, &cuts);
            let base = total(&routes);
            let mut moves = Vec::new();
            enumerate_all(&routes, &mut moves);
            for mv in moves {
                let mut after = routes.clone();
                mv.apply(&mut after);
                prop_assert_eq!(mv.delta(&routes, DEPOT, &cost), total(&after) - base, "{:?}", mv);

                let mut all: Vec<usize> = after.iter().flatten().copied().collect();
                all.sort_unstable();
                prop_assert_eq!(all, (1..=9).collect::<Vec<_>>());
            }
        }
    }
}
