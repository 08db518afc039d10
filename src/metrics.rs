//! Utilization statistics and baseline comparison for solutions.

use serde::{Deserialize, Serialize};

use crate::models::Solution;

/// Coefficient of variation below which routes count as balanced.
pub const GOOD_FAIRNESS: f64 = 0.3;

/// Coefficient of variation below which balance is acceptable.
pub const MODERATE_FAIRNESS: f64 = 0.5;

/// Summary statistics of one per-route quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Minimum.
    pub min: f64,
    /// Maximum.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl Stats {
    /// Statistics of `values`; all zero when empty.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self {
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean,
            std: var.sqrt(),
        }
    }

    /// Coefficient of variation `std / mean`, if the mean is positive.
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        (self.mean > 0.0).then(|| self.std / self.mean)
    }
}

/// Qualitative balance of work across routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FairnessRating {
    /// Coefficient of variation below 0.3.
    Good,
    /// Below 0.5.
    Moderate,
    /// 0.5 or more.
    Poor,
}

impl FairnessRating {
    /// Rates a coefficient of variation.
    pub fn from_cv(cv: f64) -> Self {
        if cv < GOOD_FAIRNESS {
            Self::Good
        } else if cv < MODERATE_FAIRNESS {
            Self::Moderate
        } else {
            Self::Poor
        }
    }
}

/// Per-route balance of a solution.
///
/// # Examples
///
/// ```
/// use u_lastmile::metrics::{FairnessRating, Utilization};
/// use u_lastmile::models::{Route, Solution};
///
/// let sol = Solution::new(
///     vec![
///         Route::new(0, vec![0, 1, 0], 10.0, 60.0, 4.0),
///         Route::new(1, vec![0, 2, 0], 10.0, 120.0, 4.0),
///     ],
///     vec![],
/// );
/// let u = Utilization::of(&sol);
/// assert_eq!(u.route_count, 2);
/// assert_eq!(u.duration_hours.mean, 1.5);
/// assert_eq!(u.distance_fairness, Some(0.0));
/// assert_eq!(u.distance_rating(), Some(FairnessRating::Good));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utilization {
    /// Used routes.
    pub route_count: usize,
    /// Route distance, km.
    pub distance_km: Stats,
    /// Route duration, hours.
    pub duration_hours: Stats,
    /// Route load.
    pub load: Stats,
    /// Coefficient of variation of route distance.
    pub distance_fairness: Option<f64>,
    /// Coefficient of variation of route load.
    pub load_fairness: Option<f64>,
}

impl Utilization {
    /// Computes the statistics over the used routes of `solution`.
    pub fn of(solution: &Solution) -> Self {
        let routes = solution.routes();
        let distances: Vec<f64> = routes.iter().map(|r| r.distance()).collect();
        let hours: Vec<f64> = routes.iter().map(|r| r.time() / 60.0).collect();
        let loads: Vec<f64> = routes.iter().map(|r| r.demand()).collect();
        let distance_km = Stats::of(&distances);
        let load = Stats::of(&loads);
        Self {
            route_count: routes.len(),
            distance_km,
            duration_hours: Stats::of(&hours),
            load,
            distance_fairness: distance_km.coefficient_of_variation(),
            load_fairness: load.coefficient_of_variation(),
        }
    }

    /// Rating of the distance balance.
    pub fn distance_rating(&self) -> Option<FairnessRating> {
        self.distance_fairness.map(FairnessRating::from_cv)
    }

    /// Rating of the load balance.
    pub fn load_rating(&self) -> Option<FairnessRating> {
        self.load_fairness.map(FairnessRating::from_cv)
    }
}

/// Operating cost rates for turning a plan into money.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    /// Cost per kilometer driven.
    pub per_km: f64,
    /// Fixed cost per vehicle used.
    pub per_vehicle: f64,
    /// Cost per hour of driver time.
    pub per_hour: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            per_km: 1.0,
            per_vehicle: 50.0,
            per_hour: 25.0,
        }
    }
}

impl CostRates {
    /// Daily cost of a solution.
    pub fn cost(&self, solution: &Solution) -> f64 {
        solution.total_distance() * self.per_km
            + solution.vehicles_used() as f64 * self.per_vehicle
            + solution.total_time() / 60.0 * self.per_hour
    }
}

/// Optimized solution measured against a baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Baseline distance, km.
    pub baseline_distance: f64,
    /// Optimized distance, km.
    pub optimized_distance: f64,
    /// Baseline time, minutes.
    pub baseline_time: f64,
    /// Optimized time, minutes.
    pub optimized_time: f64,
    /// Baseline vehicles used.
    pub baseline_vehicles: usize,
    /// Optimized vehicles used.
    pub optimized_vehicles: usize,
    /// Distance reduction in percent; `None` for a zero baseline.
    pub distance_improvement_pct: Option<f64>,
    /// Time reduction in percent; `None` for a zero baseline.
    pub time_improvement_pct: Option<f64>,
    /// Reduction of the average distance per vehicle, in percent.
    pub avg_distance_improvement_pct: Option<f64>,
    /// Reduction of the average time per vehicle, in percent.
    pub avg_time_improvement_pct: Option<f64>,
}

fn reduction_pct(before: f64, after: f64) -> Option<f64> {
    (before > 0.0).then(|| (before - after) / before * 100.0)
}

impl Comparison {
    /// Compares `optimized` against `baseline`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_lastmile::metrics::Comparison;
    /// use u_lastmile::models::{Route, Solution};
    ///
    /// let naive = Solution::new(
    ///     vec![
    ///         Route::new(0, vec![0, 1, 0], 60.0, 90.0, 1.0),
    ///         Route::new(1, vec![0, 2, 0], 40.0, 60.0, 1.0),
    ///     ],
    ///     vec![],
    /// );
    /// let optimized = Solution::new(vec![Route::new(0, vec![0, 1, 2, 0], 75.0, 120.0, 2.0)], vec![]);
    ///
    /// let c = Comparison::new(&naive, &optimized);
    /// assert_eq!(c.distance_improvement_pct, Some(25.0));
    /// assert_eq!(c.vehicles_saved(), 1);
    /// ```
    pub fn new(baseline: &Solution, optimized: &Solution) -> Self {
        let (bd, od) = (baseline.total_distance(), optimized.total_distance());
        let (bt, ot) = (baseline.total_time(), optimized.total_time());
        let (bv, ov) = (baseline.vehicles_used(), optimized.vehicles_used());
        let per = |total: f64, vehicles: usize| total / vehicles.max(1) as f64;
        let avg = |b: f64, o: f64| (bv > 0).then(|| reduction_pct(per(b, bv), per(o, ov))).flatten();
        Self {
            baseline_distance: bd,
            optimized_distance: od,
            baseline_time: bt,
            optimized_time: ot,
            baseline_vehicles: bv,
            optimized_vehicles: ov,
            distance_improvement_pct: reduction_pct(bd, od),
            time_improvement_pct: reduction_pct(bt, ot),
            avg_distance_improvement_pct: avg(bd, od),
            avg_time_improvement_pct: avg(bt, ot),
        }
    }

    /// Vehicles the optimized plan saves; negative if it uses more.
    pub fn vehicles_saved(&self) -> i64 {
        self.baseline_vehicles as i64 - self.optimized_vehicles as i64
    }

    /// Distance saved, km.
    pub fn distance_saved(&self) -> f64 {
        self.baseline_distance - self.optimized_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Route;

    #[test]
    fn test_stats() {
        let s = Stats::of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert_eq!(s.mean, 5.0);
        assert_eq!(s.std, 2.0);
        assert_eq!(s.coefficient_of_variation(), Some(0.4));
        assert_eq!(Stats::of(&[]), Stats::default());
        assert_eq!(Stats::default().coefficient_of_variation(), None);
    }

    #[test]
    fn test_fairness_rating() {
        assert_eq!(FairnessRating::from_cv(0.1), FairnessRating::Good);
        assert_eq!(FairnessRating::from_cv(0.3), FairnessRating::Moderate);
        assert_eq!(FairnessRating::from_cv(0.49), FairnessRating::Moderate);
        assert_eq!(FairnessRating::from_cv(0.5), FairnessRating::Poor);
    }

    #[test]
    fn test_empty_solution() {
        let u = Utilization::of(&Solution::new(vec![], vec![1, 2]));
        assert_eq!(u.route_count, 0);
        assert!(u.distance_fairness.is_none());
        assert!(u.load_rating().is_none());
    }

    #[test]
    fn test_zero_baseline_has_no_percentages() {
        let empty = Solution::new(vec![], vec![]);
        let one = Solution::new(vec![Route::new(0, vec![0, 1, 0], 5.0, 10.0, 1.0)], vec![]);
        let c = Comparison::new(&empty, &one);
        assert!(c.distance_improvement_pct.is_none());
        assert!(c.time_improvement_pct.is_none());
        assert!(c.avg_distance_improvement_pct.is_none());
        assert_eq!(c.vehicles_saved(), -1);
    }

    #[test]
    fn test_average_per_vehicle() {
        let naive = Solution::new(
            vec![
                Route::new(0, vec![0, 1, 0], 60.0, 90.0, 1.0),
                Route::new(1, vec![0, 2, 0], 40.0, 60.0, 1.0),
            ],
            vec![],
        );
        let opt = Solution::new(vec![Route::new(0, vec![0, 1, 2, 0], 75.0, 120.0, 2.0)], vec![]);
        let c = Comparison::new(&naive, &opt);
        // 50 km per vehicle before, 75 after.
        assert_eq!(c.avg_distance_improvement_pct, Some(-50.0));
        assert_eq!(c.time_improvement_pct, Some(20.0));
        assert_eq!(c.distance_saved(), 25.0);
    }

    #[test]
    fn test_cost_rates() {
        let sol = Solution::new(vec![Route::new(0, vec![0, 1, 0], 10.0, 120.0, 1.0)], vec![]);
        let rates = CostRates {
            per_km: 2.0,
            per_vehicle: 30.0,
            per_hour: 10.0,
        };
        assert_eq!(rates.cost(&sol), 20.0 + 30.0 + 20.0);
    }
}
