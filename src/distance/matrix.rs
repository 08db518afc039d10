//! Dense distance and travel-time matrices.

use tracing::{debug, instrument};

use super::haversine_km;
use crate::error::{Result, RoutingError};
use crate::models::StopSet;

/// Allocates an `n × n` buffer, reporting allocation failure as
/// [`RoutingError::MatrixTooLarge`].
fn alloc_square<T: Clone>(n: usize, fill: T) -> Result<Vec<T>> {
    let len = n
        .checked_mul(n)
        .ok_or(RoutingError::MatrixTooLarge { stops: n })?;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| RoutingError::MatrixTooLarge { stops: n })?;
    data.resize(len, fill);
    Ok(data)
}

/// A dense `n × n` great-circle distance matrix in kilometers, stored
/// row-major as `f32`.
///
/// # Examples
///
/// ```
/// use u_lastmile::models::{Stop, StopSet};
/// use u_lastmile::distance::DistanceMatrix;
///
/// let stops = StopSet::new(vec![
///     Stop::depot("D", 0.0, 0.0),
///     Stop::new("A", 0.0, 1.0),
///     Stop::new("B", 0.0, 2.0),
/// ]).unwrap();
/// let dm = DistanceMatrix::from_stops(&stops).unwrap();
/// assert_eq!(dm.size(), 3);
/// assert_eq!(dm.get(1, 1), 0.0);
/// assert!((dm.get(0, 1) - 111.19).abs() < 0.01);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f32>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a zero matrix of the given size.
    pub fn new(size: usize) -> Result<Self> {
        Ok(Self {
            data: alloc_square(size, 0.0)?,
            size,
        })
    }

    /// Computes haversine distances between every pair of stops.
    ///
    /// # Errors
    ///
    /// [`RoutingError::MatrixTooLarge`] if the matrix cannot be allocated.
    #[instrument(skip_all, fields(stops = stops.len()))]
    pub fn from_stops(stops: &StopSet) -> Result<Self> {
        let n = stops.len();
        let mut dm = Self::new(n)?;
        let all = stops.stops();
        for i in 0..n {
            for j in (i + 1)..n {
                let d = haversine_km(all[i].lat(), all[i].lon(), all[j].lat(), all[j].lon()) as f32;
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        debug!(size = n, bytes = n * n * std::mem::size_of::<f32>(), "built distance matrix");
        Ok(dm)
    }

    /// Creates a matrix from an explicit row-major grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f32>) -> Option<Self> {
        if data.len() != size.checked_mul(size)? {
            return None;
        }
        Some(Self { data, size })
    }

    /// Distance in kilometers from `from` to `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        f64::from(self.data[from * self.size + to])
    }

    /// Sets the distance from `from` to `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f32) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Nearest candidate to `from`; the first candidate wins ties.
    ///
    /// Returns `None` if `candidates` is empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &c in candidates {
            let d = self.get(from, c);
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((c, d));
            }
        }
        best.map(|(c, _)| c)
    }
}

/// Travel times in minutes derived from a [`DistanceMatrix`] at a fixed speed.
///
/// Cheap to rebuild when the speed changes; the distances are not recomputed.
///
/// # Examples
///
/// ```
/// use u_lastmile::distance::{DistanceMatrix, TimeMatrix};
///
/// let dm = DistanceMatrix::from_data(2, vec![0.0, 30.0, 30.0, 0.0]).unwrap();
/// let tm = TimeMatrix::from_distances(&dm, 60.0).unwrap();
/// assert_eq!(tm.get(0, 1), 30.0);
/// assert_eq!(tm.speed_kmh(), 60.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TimeMatrix {
    data: Vec<f64>,
    size: usize,
    speed_kmh: f64,
}

impl TimeMatrix {
    /// Converts distances to minutes: `distance × 60 / speed_kmh`.
    ///
    /// # Errors
    ///
    /// [`RoutingError::InvalidConfig`] for a non-positive speed,
    /// [`RoutingError::MatrixTooLarge`] on allocation failure.
    pub fn from_distances(distances: &DistanceMatrix, speed_kmh: f64) -> Result<Self> {
        if !speed_kmh.is_finite() || speed_kmh <= 0.0 {
            return Err(RoutingError::InvalidConfig(format!(
                "speed must be positive, got {speed_kmh} km/h"
            )));
        }
        let n = distances.size();
        let mut data = alloc_square(n, 0.0)?;
        for (slot, &d) in data.iter_mut().zip(&distances.data) {
            *slot = f64::from(d) * 60.0 / speed_kmh;
        }
        Ok(Self {
            data,
            size: n,
            speed_kmh,
        })
    }

    /// Travel time in minutes from `from` to `to`.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Number of locations.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Speed the times were computed for.
    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }
}
