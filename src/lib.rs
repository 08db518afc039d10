//! # u-lastmile
//!
//! Last-mile delivery routing: great-circle distance matrices, a greedy
//! baseline, and a constraint-based optimizer for capacitated routing with
//! time windows, plus auto-configuration and feasibility relaxation.
//!
//! ## Modules
//!
//! - [`models`]: Stops, fleet configuration, routes, solutions, infeasibility markers
//! - [`distance`]: Haversine distance and travel time matrices
//! - [`evaluation`]: Route totals, time schedules, and constraint checks
//! - [`constructive`]: Greedy baseline and first-solution strategies
//! - [`local_search`]: Neighborhood moves (relocate, exchange, 2-opt, or-opt, 2-opt*)
//! - [`optimizer`]: Routing model, metaheuristic search, and the [`Optimizer`](optimizer::Optimizer) facade
//! - [`advisor`]: Suggested configuration from dataset statistics
//! - [`relaxation`]: Retry ladder that loosens constraints until a run succeeds
//! - [`metrics`]: Route balance statistics and baseline comparison
//! - [`demo_data`]: Seeded synthetic datasets
//!
//! The library logs through [`tracing`] and never installs a subscriber.

pub mod advisor;
pub mod constructive;
pub mod demo_data;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod metrics;
pub mod models;
pub mod optimizer;
pub mod relaxation;

pub use error::{Result, RoutingError};
