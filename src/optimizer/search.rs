//! Local search guided by a metaheuristic under a wall-clock budget.
//!
//! # Algorithm
//!
//! All metaheuristics explore the neighborhoods of
//! [`local_search`](crate::local_search) and only ever move to routes that
//! satisfy every dimension of the model, so the incumbent stays feasible.
//!
//! - `None`: best-improvement descent, stopping at the first local optimum.
//! - `GuidedLocalSearch`: descent on the augmented cost
//!   `cost + lambda * penalty`; at each local optimum the arcs with maximal
//!   utility are penalized.
//! - `TabuSearch`: always takes the best admissible move, even a worsening
//!   one; stops moved recently are tabu unless the move yields a new best.
//! - `SimulatedAnnealing`: random moves accepted by the Metropolis rule with
//!   geometric cooling.
//!
//! The search ends at the time limit, after `max_stall_iterations`
//! iterations without a new best, or when no move is left.
//!
//! # Reference
//!
//! Voudouris, C. & Tsang, E. (1999). "Guided local search and its
//! application to the traveling salesman problem", *European Journal of
//! Operational Research* 113(2), 469-499.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::penalty::PenaltyMatrix;
use super::{Routes, RoutingModel};
use crate::local_search::{enumerate_all, Move, Neighborhood};
use crate::models::{FleetConfig, Metaheuristic};

/// Annealing temperature multiplier per iteration.
const COOLING_RATE: f64 = 0.9995;

/// Floor of the annealing temperature.
const MIN_TEMPERATURE: f64 = 1e-3;

/// Share of the initial cost a worsening move may cost and still be
/// accepted with probability one half at the start of annealing.
const START_TEMPERATURE_WEIGHT: f64 = 0.01;

/// Lambda as a share of the average arc cost at the first local optimum.
const GLS_ALPHA: f64 = 0.1;

/// Search parameters taken from the fleet configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Strategy for escaping local optima.
    pub metaheuristic: Metaheuristic,
    /// Wall-clock budget.
    pub time_limit: Duration,
    /// Iterations without a new best before stopping.
    pub max_stall_iterations: usize,
    /// Random seed.
    pub seed: u64,
}

impl SearchParams {
    /// Extracts the search parameters of `config`.
    pub fn from_config(config: &FleetConfig) -> Self {
        Self {
            metaheuristic: config.metaheuristic,
            time_limit: config.time_limit,
            max_stall_iterations: config.max_stall_iterations,
            seed: config.seed,
        }
    }
}

/// Why the search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// No admissible move remained.
    LocalOptimum,
    /// The wall-clock budget ran out.
    TimeLimit,
    /// Too many iterations without a new best.
    Stalled,
}

/// Best routes found by [`improve`].
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best routes, one per vehicle.
    pub routes: Routes,
    /// Cost of `routes` in meters.
    pub cost: i64,
    /// Iterations performed.
    pub iterations: usize,
    /// Termination cause.
    pub stop_reason: StopReason,
}

/// Improves feasible `routes` until the budget or stall limit is reached.
///
/// The returned routes are the cheapest seen and are feasible whenever the
/// input is.
pub fn improve(model: &RoutingModel<'_>, routes: Routes, params: &SearchParams) -> SearchResult {
    let initial_cost = model.solution_cost(&routes);
    let mut search = Search {
        model,
        deadline: Instant::now().checked_add(params.time_limit),
        max_stall: params.max_stall_iterations,
        best: routes.clone(),
        best_cost: initial_cost,
        iterations: 0,
        stall: 0,
        moves: Vec::new(),
    };

    let stop_reason = match params.metaheuristic {
        Metaheuristic::None => search.descend(routes),
        Metaheuristic::GuidedLocalSearch => search.guided(routes),
        Metaheuristic::TabuSearch => search.tabu(routes),
        Metaheuristic::SimulatedAnnealing => search.anneal(routes, params.seed),
    };

    info!(
        metaheuristic = %params.metaheuristic,
        ?stop_reason,
        iterations = search.iterations,
        initial_cost,
        best_cost = search.best_cost,
        "search finished"
    );
    SearchResult {
        routes: search.best,
        cost: search.best_cost,
        iterations: search.iterations,
        stop_reason,
    }
}

struct Search<'m, 'a> {
    model: &'m RoutingModel<'a>,
    /// `None` when the budget overflows the clock.
    deadline: Option<Instant>,
    max_stall: usize,
    best: Routes,
    best_cost: i64,
    iterations: usize,
    stall: usize,
    moves: Vec<Move>,
}

impl Search<'_, '_> {
    fn should_stop(&self) -> Option<StopReason> {
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            Some(StopReason::TimeLimit)
        } else if self.stall >= self.max_stall {
            Some(StopReason::Stalled)
        } else {
            None
        }
    }

    /// Counts one iteration ending at `routes`, keeping it if it is a new best.
    fn record(&mut self, routes: &Routes, cost: i64) {
        self.iterations += 1;
        if cost < self.best_cost {
            self.best.clone_from(routes);
            self.best_cost = cost;
            self.stall = 0;
            debug!(iteration = self.iterations, cost, "new best solution");
        } else {
            self.stall += 1;
        }
    }

    fn is_feasible(&self, routes: &Routes, mv: &Move) -> bool {
        if self.model.dimensions().is_empty() {
            return true;
        }
        let (first, second) = mv.preview(routes);
        self.model.is_feasible(&first) && second.is_none_or(|r| self.model.is_feasible(&r))
    }

    /// Most improving feasible move under `cost`, with its delta.
    fn best_move<F>(&mut self, routes: &Routes, cost: &F) -> Option<(Move, i64)>
    where
        F: Fn(usize, usize) -> i64,
    {
        let depot = self.model.depot();
        self.moves.clear();
        enumerate_all(routes, &mut self.moves);
        let mut improving: Vec<(i64, Move)> = self
            .moves
            .iter()
            .filter_map(|mv| {
                let d = mv.delta(routes, depot, cost);
                (d < 0).then_some((d, *mv))
            })
            .collect();
        improving.sort_by_key(|&(d, _)| d);
        improving
            .into_iter()
            .find(|(_, mv)| self.is_feasible(routes, mv))
            .map(|(d, mv)| (mv, d))
    }

    fn descend(&mut self, mut routes: Routes) -> StopReason {
        let model = self.model;
        let cost_fn = |i: usize, j: usize| model.arc_cost(i, j);
        let mut cost = self.best_cost;
        loop {
            if let Some(reason) = self.should_stop() {
                return reason;
            }
            let Some((mv, d)) = self.best_move(&routes, &cost_fn) else {
                return StopReason::LocalOptimum;
            };
            mv.apply(&mut routes);
            cost += d;
            self.record(&routes, cost);
        }
    }

    fn guided(&mut self, mut routes: Routes) -> StopReason {
        let model = self.model;
        let depot = model.depot();
        let cost_fn = |i: usize, j: usize| model.arc_cost(i, j);
        let mut penalties = PenaltyMatrix::new(model.num_nodes());
        let mut lambda = 0i64;
        let mut cost = self.best_cost;

        loop {
            if let Some(reason) = self.should_stop() {
                return reason;
            }
            let step = {
                let p = &penalties;
                let augmented = |i: usize, j: usize| model.arc_cost(i, j) + lambda * i64::from(p.get(i, j));
                self.best_move(&routes, &augmented)
            };
            match step {
                Some((mv, _)) => {
                    cost += mv.delta(&routes, depot, &cost_fn);
                    mv.apply(&mut routes);
                    self.record(&routes, cost);
                }
                None => {
                    if lambda == 0 {
                        let arcs = routes.iter().filter(|r| !r.is_empty()).map(|r| r.len() + 1).sum::<usize>();
                        lambda = ((GLS_ALPHA * cost as f64 / arcs.max(1) as f64).round() as i64).max(1);
                        debug!(lambda, "guided local search penalty weight set");
                    }
                    penalties.penalize(&routes, depot, cost_fn);
                    self.iterations += 1;
                    self.stall += 1;
                }
            }
        }
    }

    fn tabu(&mut self, mut routes: Routes) -> StopReason {
        let model = self.model;
        let depot = model.depot();
        let cost_fn = |i: usize, j: usize| model.arc_cost(i, j);
        let tenure = (model.num_nodes() / 5).clamp(5, 25);
        // Stop s is tabu while the iteration count is below tabu_until[s].
        let mut tabu_until = vec![0usize; model.num_nodes()];
        let mut cost = self.best_cost;

        loop {
            if let Some(reason) = self.should_stop() {
                return reason;
            }
            self.moves.clear();
            enumerate_all(&routes, &mut self.moves);
            let mut scored: Vec<(i64, Move)> = self
                .moves
                .iter()
                .map(|mv| (mv.delta(&routes, depot, &cost_fn), *mv))
                .collect();
            scored.sort_by_key(|&(d, _)| d);

            let iteration = self.iterations;
            let chosen = scored.into_iter().find(|(d, mv)| {
                let aspiration = cost + d < self.best_cost;
                let allowed = aspiration
                    || mv
                        .moved_stops(&routes)
                        .iter()
                        .all(|&s| tabu_until[s] <= iteration);
                allowed && self.is_feasible(&routes, mv)
            });
            let Some((d, mv)) = chosen else {
                return StopReason::LocalOptimum;
            };

            for s in mv.moved_stops(&routes) {
                tabu_until[s] = iteration + tenure + 1;
            }
            mv.apply(&mut routes);
            cost += d;
            self.record(&routes, cost);
        }
    }

    fn anneal(&mut self, mut routes: Routes, seed: u64) -> StopReason {
        let model = self.model;
        let depot = model.depot();
        let cost_fn = |i: usize, j: usize| model.arc_cost(i, j);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut cost = self.best_cost;
        let mut temperature =
            (START_TEMPERATURE_WEIGHT * cost as f64 / std::f64::consts::LN_2).max(MIN_TEMPERATURE);

        loop {
            if let Some(reason) = self.should_stop() {
                return reason;
            }
            let hood = Neighborhood::ALL[rng.random_range(0..Neighborhood::ALL.len())];
            if let Some(mv) = hood.random(&routes, &mut rng) {
                let d = mv.delta(&routes, depot, &cost_fn);
                let accept = d <= 0 || rng.random::<f64>() < (-(d as f64) / temperature).exp();
                if accept && self.is_feasible(&routes, &mv) {
                    mv.apply(&mut routes);
                    cost += d;
                }
            }
            self.record(&routes, cost);
            temperature = (temperature * COOLING_RATE).max(MIN_TEMPERATURE);
        }
    }
}
