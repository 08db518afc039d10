//! Domain model types for last-mile routing.
//!
//! Provides validated stops with demands and time windows, the fleet and
//! search configuration, and the routes, solutions, and infeasibility
//! markers the solvers produce.

mod clock;
mod config;
mod route;
mod solution;
mod stop;

pub use clock::{format_clock_time, parse_clock_time};
pub use config::{DepotWindow, FirstSolutionStrategy, FleetConfig, Metaheuristic};
pub use route::Route;
pub use solution::{Infeasibility, InfeasibilityKind, Outcome, Solution};
pub use stop::{Stop, StopSet, TimeWindow};
