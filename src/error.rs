//! Error type for invalid input and exceptional conditions.
//!
//! Infeasibility is not an error: the optimizer and the greedy baseline
//! report it as [`Outcome::Infeasible`](crate::models::Outcome). The variants
//! here abort the call chain and are never retried internally.

use thiserror::Error;

/// Errors raised before or outside of the search.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// Latitude or longitude out of range or not finite.
    #[error(
        "stop `{id}` has invalid coordinates ({lat}, {lon}): latitude must be within [-90, 90] and longitude within [-180, 180]"
    )]
    InvalidCoordinates {
        /// Stop id.
        id: String,
        /// Given latitude.
        lat: f64,
        /// Given longitude.
        lon: f64,
    },

    /// A numeric stop attribute is negative or not finite.
    #[error("stop `{id}` has invalid {field} `{value}`: expected a finite, non-negative number")]
    InvalidStopAttribute {
        /// Stop id.
        id: String,
        /// Attribute name.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Window closes before it opens.
    #[error("stop `{id}` has a time window that closes ({latest}) before it opens ({earliest})")]
    InvertedTimeWindow {
        /// Stop id.
        id: String,
        /// Window start, minutes from midnight.
        earliest: f64,
        /// Window end, minutes from midnight.
        latest: f64,
    },

    /// Two stops share an id.
    #[error("stop id `{0}` appears more than once")]
    DuplicateStopId(String),

    /// No stop is flagged as the depot.
    #[error("no depot designated: flag exactly one stop as the depot")]
    MissingDepot,

    /// More than one stop is flagged as the depot.
    #[error("{0} stops are flagged as depot: single-depot routing needs exactly one")]
    MultipleDepots(usize),

    /// The requested depot id is not in the table.
    #[error("depot id `{0}` does not match any stop")]
    UnknownDepot(String),

    /// Fewer than two customer stops.
    #[error("at least 2 customer stops are required, got {0}")]
    NotEnoughCustomers(usize),

    /// A configuration value or tag is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The n × n matrix overflows or cannot be allocated.
    #[error("cannot allocate a distance matrix for {stops} stops: reduce the number of stops")]
    MatrixTooLarge {
        /// Requested number of stops.
        stops: usize,
    },

    /// A matrix was built for a different stop set.
    #[error("matrix covers {matrix} locations but the stop set has {stops}")]
    MatrixSizeMismatch {
        /// Locations in the matrix.
        matrix: usize,
        /// Stops in the stop set.
        stops: usize,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RoutingError>;
