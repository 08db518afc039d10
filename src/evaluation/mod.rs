//! Route evaluation and constraint checking.
//!
//! Computes per-route totals and time schedules, and derives which
//! constraints a configuration enforces on a given stop set.

mod evaluator;

pub use evaluator::{
    Constraints, RouteEvaluator, RouteTail, RouteTotals, TimeProfile, TimeRules, Violation, Visit,
};
