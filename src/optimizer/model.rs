//! The routing model: arc costs plus the active dimensions.

use tracing::debug;

use super::Dimension;
use crate::distance::{DistanceMatrix, TimeMatrix};
use crate::evaluation::{Constraints, RouteEvaluator};
use crate::models::{FleetConfig, StopSet};

/// Routes are held as customer sequences, one per vehicle; the depot is
/// implied at both ends.
pub type Routes = Vec<Vec<usize>>;

/// One routing graph over all stop positions with `num_vehicles` identical
/// vehicles sharing the depot.
///
/// Arc costs are integer meters so that the search compares costs exactly.
///
/// # Examples
///
/// ```
/// use u_lastmile::models::{FleetConfig, Stop, StopSet};
/// use u_lastmile::distance::{DistanceMatrix, TimeMatrix};
/// use u_lastmile::optimizer::RoutingModel;
///
/// let stops = StopSet::new(vec![
///     Stop::depot("D", 0.0, 0.0),
///     Stop::new("A", 0.0, 1.0).with_demand(3.0),
///     Stop::new("B", 0.0, 2.0).with_demand(3.0),
/// ]).unwrap();
/// let dm = DistanceMatrix::from_stops(&stops).unwrap();
/// let tm = TimeMatrix::from_distances(&dm, 60.0).unwrap();
/// let config = FleetConfig::default().with_capacity(5.0).without_max_route_hours();
///
/// let model = RoutingModel::new(&stops, &dm, &tm, &config);
/// assert_eq!(model.dimensions().len(), 1);
/// assert!(model.is_feasible(&[1]));
/// assert!(!model.is_feasible(&[1, 2]));
/// ```
pub struct RoutingModel<'a> {
    eval: RouteEvaluator<'a>,
    num_vehicles: usize,
    constraints: Constraints,
    dimensions: Vec<Dimension>,
}

impl<'a> RoutingModel<'a> {
    /// Builds the model, adding a capacity dimension when capacity is
    /// configured and some stop has demand, and a time dimension when
    /// windows are enforced and present or a duration cap is set.
    pub fn new(
        stops: &'a StopSet,
        distances: &'a DistanceMatrix,
        times: &'a TimeMatrix,
        config: &FleetConfig,
    ) -> Self {
        let constraints = Constraints::from_config(config, stops);
        let mut dimensions = Vec::with_capacity(2);
        if let Some(capacity) = constraints.capacity {
            dimensions.push(Dimension::Capacity { capacity });
        }
        if let Some(rules) = constraints.time {
            dimensions.push(Dimension::Time(rules));
        }
        debug!(
            nodes = stops.len(),
            vehicles = config.num_vehicles,
            dimensions = ?dimensions.iter().map(Dimension::name).collect::<Vec<_>>(),
            "built routing model"
        );
        Self {
            eval: RouteEvaluator::new(stops, distances, times),
            num_vehicles: config.num_vehicles,
            constraints,
            dimensions,
        }
    }

    /// Shared route evaluator.
    pub fn evaluator(&self) -> &RouteEvaluator<'a> {
        &self.eval
    }

    /// Constraints enforced by the dimensions.
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Active dimensions.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Number of vehicles.
    pub fn num_vehicles(&self) -> usize {
        self.num_vehicles
    }

    /// Depot position.
    pub fn depot(&self) -> usize {
        self.eval.stops().depot()
    }

    /// Number of stop positions including the depot.
    pub fn num_nodes(&self) -> usize {
        self.eval.stops().len()
    }

    /// Customer positions.
    pub fn customers(&self) -> Vec<usize> {
        self.eval.stops().customers().collect()
    }

    /// Cost of travelling from `from` to `to`, in meters.
    #[inline]
    pub fn arc_cost(&self, from: usize, to: usize) -> i64 {
        (self.eval.distances().get(from, to) * 1000.0) as i64
    }

    /// Cost of one depot-to-depot route.
    pub fn route_cost(&self, route: &[usize]) -> i64 {
        if route.is_empty() {
            return 0;
        }
        let depot = self.depot();
        let mut cost = 0;
        let mut prev = depot;
        for &c in route {
            cost += self.arc_cost(prev, c);
            prev = c;
        }
        cost + self.arc_cost(prev, depot)
    }

    /// Total cost of all routes.
    pub fn solution_cost(&self, routes: &[Vec<usize>]) -> i64 {
        routes.iter().map(|r| self.route_cost(r)).sum()
    }

    /// Returns `true` if the route satisfies every dimension.
    pub fn is_feasible(&self, route: &[usize]) -> bool {
        self.dimensions
            .iter()
            .all(|d| d.check(&self.eval, route).is_ok())
    }

    /// Returns `true` if inserting `customer` at `pos` keeps the route
    /// feasible. `scratch` is reused between calls.
    pub fn insertion_feasible(
        &self,
        route: &[usize],
        pos: usize,
        customer: usize,
        scratch: &mut Vec<usize>,
    ) -> bool {
        if self.dimensions.is_empty() {
            return true;
        }
        scratch.clear();
        scratch.extend_from_slice(&route[..pos]);
        scratch.push(customer);
        scratch.extend_from_slice(&route[pos..]);
        self.is_feasible(scratch)
    }

    /// Cost increase of inserting `customer` at `pos`.
    pub fn insertion_delta(&self, route: &[usize], pos: usize, customer: usize) -> i64 {
        let depot = self.depot();
        let prev = if pos == 0 { depot } else { route[pos - 1] };
        let next = route.get(pos).copied().unwrap_or(depot);
        self.arc_cost(prev, customer) + self.arc_cost(customer, next) - self.arc_cost(prev, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Stop;

    fn stops() -> StopSet {
        StopSet::new(vec![
            Stop::depot("D", 0.0, 0.0),
            Stop::new("A", 0.0, 1.0).with_time_window(None, Some(600.0)),
            Stop::new("B", 0.0, 2.0),
            Stop::new("C", 1.0, 1.0),
        ])
        .expect("valid")
    }

    #[test]
    fn test_arc_cost_in_meters() {
        let s = stops();
        let dm = DistanceMatrix::from_stops(&s).expect("alloc");
        let tm = TimeMatrix::from_distances(&dm, 60.0).expect("valid");
        let model = RoutingModel::new(&s, &dm, &tm, &FleetConfig::default());
        assert_eq!(model.arc_cost(0, 1), (dm.get(0, 1) * 1000.0) as i64);
        assert_eq!(model.arc_cost(2, 2), 0);
        assert_eq!(model.route_cost(&[]), 0);
        assert_eq!(
            model.route_cost(&[1, 2]),
            model.arc_cost(0, 1) + model.arc_cost(1, 2) + model.arc_cost(2, 0)
        );
    }

    #[test]
    fn test_dimensions_follow_config() {
        let s = stops();
        let dm = DistanceMatrix::from_stops(&s).expect("alloc");
        let tm = TimeMatrix::from_distances(&dm, 60.0).expect("valid");

        // Capacity requested but no demand: no capacity dimension.
        let config = FleetConfig::default().with_capacity(1.0);
        let model = RoutingModel::new(&s, &dm, &tm, &config);
        assert_eq!(model.dimensions().len(), 1);
        assert_eq!(model.dimensions()[0].name(), "Time");

        let config = FleetConfig::default()
            .without_max_route_hours()
            .with_time_windows(false);
        let model = RoutingModel::new(&s, &dm, &tm, &config);
        assert!(model.dimensions().is_empty());
        assert!(model.is_feasible(&[1, 2, 3]));
    }

    #[test]
    fn test_insertion_delta_and_feasibility() {
        let s = stops();
        let dm = DistanceMatrix::from_stops(&s).expect("alloc");
        let tm = TimeMatrix::from_distances(&dm, 60.0).expect("valid");
        let config = FleetConfig::default().without_max_route_hours();
        let model = RoutingModel::new(&s, &dm, &tm, &config);

        let route = vec![2];
        let delta = model.insertion_delta(&route, 0, 1);
        assert_eq!(
            delta,
            model.arc_cost(0, 1) + model.arc_cost(1, 2) - model.arc_cost(0, 2)
        );

        let mut scratch = Vec::new();
        // A closes at 10:00; reaching it after B takes over three hours.
        assert!(model.insertion_feasible(&route, 0, 1, &mut scratch));
        assert!(!model.insertion_feasible(&route, 1, 1, &mut scratch));
    }
}
