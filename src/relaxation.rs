//! Escalating constraint relaxation around the optimizer.
//!
//! When a configuration is infeasible the controller retries with a fixed
//! ladder of looser configurations, each derived from the original one,
//! and stops at the first success:
//!
//! 1. the configuration as given;
//! 2. capacity × 1.5, × 2, × 3 (only when capacity is enforced);
//! 3. route duration and depot closing time + 2 h, + 4 h, + 6 h, with the
//!    original capacity;
//! 4. + 6 h with capacity and time windows disabled.
//!
//! Closing time is capped at 23:00 and never moved earlier. A missing
//! duration cap stays missing.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::models::{FleetConfig, InfeasibilityKind, Outcome};
use crate::optimizer::Optimizer;

/// Capacity multipliers tried in order.
pub const CAPACITY_FACTORS: [f64; 3] = [1.5, 2.0, 3.0];

/// Hours added to the duration cap and closing time, in order.
pub const EXTRA_HOURS: [u32; 3] = [2, 4, FINAL_EXTRA_HOURS];

/// Extension kept by the last-resort stage.
pub const FINAL_EXTRA_HOURS: u32 = 6;

/// Latest closing time an extension may reach (23:00).
pub const LATEST_CLOSE_MINUTES: f64 = 23.0 * 60.0;

/// Ladder stage that produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelaxationStage {
    /// The configuration as given.
    Original,
    /// Capacity scaled up.
    Capacity,
    /// Duration cap and depot closing time extended.
    Hours,
    /// Capacity and time windows disabled.
    ConstraintsDisabled,
}

/// What the controller relaxed to obtain its result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaxationReport {
    /// Stage of the returned result.
    pub stage: RelaxationStage,
    /// Optimizer runs performed.
    pub attempts: usize,
    /// Capacity multiplier, for the capacity stage.
    pub capacity_factor: Option<f64>,
    /// Capacity in effect.
    pub capacity: Option<f64>,
    /// Whether capacity enforcement was dropped.
    pub capacity_disabled: bool,
    /// Whether time window enforcement was dropped.
    pub time_windows_disabled: bool,
    /// Hours added to the duration cap and closing time.
    pub extra_hours: u32,
    /// Duration cap in effect.
    pub max_route_hours: Option<f64>,
    /// Depot closing time in effect, minutes from midnight.
    pub depot_close: f64,
    /// Set when every stage failed.
    pub exhausted: bool,
}

impl RelaxationReport {
    /// Returns `true` if the result needed a looser configuration.
    pub fn is_relaxed(&self) -> bool {
        self.stage != RelaxationStage::Original && !self.exhausted
    }
}

impl fmt::Display for RelaxationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exhausted {
            return write!(
                f,
                "No feasible solution after {} attempts, even with capacity and time windows disabled. \
                 Add vehicles or remove unreachable stops.",
                self.attempts
            );
        }
        match self.stage {
            RelaxationStage::Original => f.write_str("Solved with the given configuration."),
            RelaxationStage::Capacity => write!(
                f,
                "Vehicle capacity raised by a factor of {} to {}.",
                self.capacity_factor.unwrap_or(1.0),
                self.capacity.unwrap_or(0.0)
            ),
            RelaxationStage::Hours => write!(
                f,
                "Working day extended by {} h; depot closes at {}.",
                self.extra_hours,
                crate::models::format_clock_time(self.depot_close)
            ),
            RelaxationStage::ConstraintsDisabled => write!(
                f,
                "Capacity and time windows disabled; working day extended by {} h.",
                self.extra_hours
            ),
        }
    }
}

/// Result of [`RelaxationController::solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxationOutcome {
    /// The first solved outcome, or the last infeasible one.
    pub outcome: Outcome,
    /// Configuration that produced `outcome`.
    pub config: FleetConfig,
    /// What was relaxed.
    pub report: RelaxationReport,
}

/// One rung of the ladder: a transformation of the original configuration.
struct Step {
    stage: RelaxationStage,
    capacity_factor: Option<f64>,
    extra_hours: u32,
    relax: Box<dyn Fn(&FleetConfig) -> FleetConfig>,
}

impl Step {
    fn original() -> Self {
        Self {
            stage: RelaxationStage::Original,
            capacity_factor: None,
            extra_hours: 0,
            relax: Box::new(FleetConfig::clone),
        }
    }

    fn report(&self, config: &FleetConfig, attempts: usize) -> RelaxationReport {
        let disabled = self.stage == RelaxationStage::ConstraintsDisabled;
        RelaxationReport {
            stage: self.stage,
            attempts,
            capacity_factor: self.capacity_factor,
            capacity: config.capacity,
            capacity_disabled: disabled,
            time_windows_disabled: disabled,
            extra_hours: self.extra_hours,
            max_route_hours: config.max_route_duration_hours,
            depot_close: config.depot_window.close,
            exhausted: false,
        }
    }
}

/// Extends the duration cap and the depot closing time by `hours`.
fn extend_hours(base: &FleetConfig, hours: u32) -> FleetConfig {
    let mut config = base.clone();
    let extra = f64::from(hours);
    config.max_route_duration_hours = base.max_route_duration_hours.map(|h| h + extra);
    let close = base.depot_window.close;
    config.depot_window.close = close.max((close + extra * 60.0).min(LATEST_CLOSE_MINUTES));
    config
}

/// The relaxation stages tried after the original configuration fails.
fn ladder(capacity_enforced: bool) -> Vec<Step> {
    let mut steps = Vec::with_capacity(CAPACITY_FACTORS.len() + EXTRA_HOURS.len() + 1);
    if capacity_enforced {
        for factor in CAPACITY_FACTORS {
            steps.push(Step {
                stage: RelaxationStage::Capacity,
                capacity_factor: Some(factor),
                extra_hours: 0,
                relax: Box::new(move |base: &FleetConfig| {
                    let mut config = base.clone();
                    config.capacity = base.capacity.map(|c| c * factor);
                    config
                }),
            });
        }
    }
    for hours in EXTRA_HOURS {
        steps.push(Step {
            stage: RelaxationStage::Hours,
            capacity_factor: None,
            extra_hours: hours,
            relax: Box::new(move |base: &FleetConfig| extend_hours(base, hours)),
        });
    }
    steps.push(Step {
        stage: RelaxationStage::ConstraintsDisabled,
        capacity_factor: None,
        extra_hours: FINAL_EXTRA_HOURS,
        relax: Box::new(|base: &FleetConfig| {
            let mut config = extend_hours(base, FINAL_EXTRA_HOURS);
            config.capacity = None;
            config.enforce_time_windows = false;
            config
        }),
    });
    steps
}

/// Runs the optimizer through the relaxation ladder.
///
/// # Examples
///
/// ```
/// use u_lastmile::models::{FleetConfig, Metaheuristic, Stop, StopSet};
/// use u_lastmile::distance::{DistanceMatrix, TimeMatrix};
/// use u_lastmile::optimizer::Optimizer;
/// use u_lastmile::relaxation::{RelaxationController, RelaxationStage};
///
/// let stops = StopSet::new(vec![
///     Stop::depot("D", 0.0, 0.0),
///     Stop::new("A", 0.0, 0.1).with_demand(3.0),
///     Stop::new("B", 0.0, 0.2).with_demand(3.0),
/// ]).unwrap();
/// let dm = DistanceMatrix::from_stops(&stops).unwrap();
/// let tm = TimeMatrix::from_distances(&dm, 45.0).unwrap();
/// let config = FleetConfig::default()
///     .with_vehicles(1)
///     .with_capacity(5.0)
///     .with_metaheuristic(Metaheuristic::None);
///
/// let controller = RelaxationController::new(Optimizer::new(&stops, &dm, &tm));
/// let result = controller.solve(&config).unwrap();
/// assert!(result.outcome.is_solved());
/// assert_eq!(result.report.stage, RelaxationStage::Capacity);
/// assert_eq!(result.config.capacity, Some(7.5));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RelaxationController<'a> {
    optimizer: Optimizer<'a>,
}

impl<'a> RelaxationController<'a> {
    /// Wraps an optimizer.
    pub fn new(optimizer: Optimizer<'a>) -> Self {
        Self { optimizer }
    }

    /// Solves `base`, relaxing it stage by stage until a run succeeds.
    ///
    /// Structural infeasibility (no vehicles, too few stops) is returned
    /// at once since no relaxation can fix it.
    ///
    /// # Errors
    ///
    /// Propagates the optimizer's errors unchanged.
    #[instrument(skip_all, fields(vehicles = base.num_vehicles))]
    pub fn solve(&self, base: &FleetConfig) -> Result<RelaxationOutcome> {
        let mut last = self.attempt(&Step::original(), base, 1)?;
        let structural = last.outcome.infeasibility().is_some_and(|i| {
            matches!(i.kind, InfeasibilityKind::NoVehicles | InfeasibilityKind::NotEnoughStops)
        });
        if last.outcome.is_solved() || structural {
            return Ok(last);
        }

        let stops = self.optimizer.stops();
        let capacity_enforced = stops.has_demand() && base.capacity.is_some_and(|c| c > 0.0);
        for (k, step) in ladder(capacity_enforced).iter().enumerate() {
            last = self.attempt(step, base, k + 2)?;
            if last.outcome.is_solved() {
                info!(stage = ?last.report.stage, attempts = k + 2, "solved after relaxation");
                return Ok(last);
            }
        }

        last.report.exhausted = true;
        warn!(attempts = last.report.attempts, "every relaxation stage failed");
        Ok(last)
    }

    fn attempt(&self, step: &Step, base: &FleetConfig, attempt: usize) -> Result<RelaxationOutcome> {
        let config = (step.relax)(base);
        info!(
            stage = ?step.stage,
            attempt,
            capacity = ?config.capacity,
            max_route_hours = ?config.max_route_duration_hours,
            depot_close = config.depot_window.close,
            enforce_time_windows = config.enforce_time_windows,
            "trying configuration"
        );
        let outcome = self.optimizer.solve(&config)?;
        let report = step.report(&config, attempt);
        Ok(RelaxationOutcome {
            outcome,
            config,
            report,
        })
    }
}
