//! Route dimensions: quantities accumulated along a route with bounds.

use crate::evaluation::{RouteEvaluator, TimeRules, Violation};

/// A per-route accumulator with bounds checked at every stop.
///
/// - `Capacity` accumulates demand from zero at the depot and is bounded by
///   the vehicle capacity.
/// - `Time` accumulates travel time plus the origin's service time. Each
///   stop bounds its service start by its window, the depot bounds both
///   route ends by its operating hours, and the span may be capped.
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    /// Load dimension.
    Capacity {
        /// Vehicle capacity.
        capacity: f64,
    },
    /// Elapsed time dimension.
    Time(TimeRules),
}

impl Dimension {
    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Capacity { .. } => "Capacity",
            Dimension::Time(_) => "Time",
        }
    }

    /// Checks a customer sequence against the dimension's bounds.
    pub fn check(&self, eval: &RouteEvaluator<'_>, route: &[usize]) -> Result<(), Violation> {
        match self {
            Dimension::Capacity { capacity } => {
                let load = eval.load(route);
                if load > *capacity {
                    Err(Violation::CapacityExceeded {
                        load,
                        capacity: *capacity,
                    })
                } else {
                    Ok(())
                }
            }
            Dimension::Time(rules) => eval.time_profile(route, rules).map(|_| ()),
        }
    }
}
