//! Arc penalties for guided local search.
//!
//! Each arc `(i, j)` of the routing graph is a solution feature. At a local
//! optimum the arcs in use with the highest utility
//! `cost(i, j) / (1 + penalty(i, j))` have their penalty raised by one,
//! making them more expensive in the augmented objective
//! `cost + lambda * penalty`.

/// Dense row-major penalty counts over all node pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyMatrix {
    data: Vec<u32>,
    size: usize,
}

impl PenaltyMatrix {
    /// Creates an all-zero matrix over `size` nodes.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0; size * size],
            size,
        }
    }

    /// Penalty count of arc `(from, to)`.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> u32 {
        self.data[from * self.size + to]
    }

    /// Raises the penalty of arc `(from, to)` by one.
    #[inline]
    pub fn increment(&mut self, from: usize, to: usize) {
        let p = &mut self.data[from * self.size + to];
        *p = p.saturating_add(1);
    }

    /// Sum of penalties over the arcs of `routes`.
    pub fn total(&self, routes: &[Vec<usize>], depot: usize) -> u64 {
        let mut sum = 0u64;
        for_each_arc(routes, depot, |i, j| sum += u64::from(self.get(i, j)));
        sum
    }

    /// Penalizes the arcs of `routes` with maximal utility under `cost`.
    ///
    /// Returns the number of arcs penalized.
    pub fn penalize<F>(&mut self, routes: &[Vec<usize>], depot: usize, cost: F) -> usize
    where
        F: Fn(usize, usize) -> i64,
    {
        let mut arcs = Vec::new();
        let mut best = f64::NEG_INFINITY;
        for_each_arc(routes, depot, |i, j| {
            let utility = cost(i, j) as f64 / (1.0 + f64::from(self.get(i, j)));
            if utility > best {
                best = utility;
                arcs.clear();
            }
            if utility == best {
                arcs.push((i, j));
            }
        });
        for &(i, j) in &arcs {
            self.increment(i, j);
        }
        arcs.len()
    }
}

/// Calls `f` on every arc of every non-empty route, depot legs included.
pub fn for_each_arc<F>(routes: &[Vec<usize>], depot: usize, mut f: F)
where
    F: FnMut(usize, usize),
{
    for route in routes.iter().filter(|r| !r.is_empty()) {
        let mut prev = depot;
        for &c in route {
            f(prev, c);
            prev = c;
        }
        f(prev, depot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arcs_include_depot_legs() {
        let mut arcs = Vec::new();
        for_each_arc(&[vec![1, 2], vec![], vec![3]], 0, |i, j| arcs.push((i, j)));
        assert_eq!(arcs, vec![(0, 1), (1, 2), (2, 0), (0, 3), (3, 0)]);
    }

    #[test]
    fn test_penalize_max_utility() {
        let mut p = PenaltyMatrix::new(3);
        let routes = vec![vec![1, 2]];
        // Arc (1, 2) is the most expensive.
        let cost = |i: usize, j: usize| if (i, j) == (1, 2) { 10 } else { 4 };

        assert_eq!(p.penalize(&routes, 0, cost), 1);
        assert_eq!(p.get(1, 2), 1);
        assert_eq!(p.total(&routes, 0), 1);

        // Utility of (1, 2) drops to 5, still above 4.
        p.penalize(&routes, 0, cost);
        assert_eq!(p.get(1, 2), 2);

        // Now 10 / 3 < 4: the two depot legs tie and both get penalized.
        assert_eq!(p.penalize(&routes, 0, cost), 2);
        assert_eq!(p.get(0, 1), 1);
        assert_eq!(p.get(2, 0), 1);
        assert_eq!(p.total(&routes, 0), 4);
    }
}
