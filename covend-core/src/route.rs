//! Vehicle routes through demand points.
//!
//! A route stores only its visit order. Load and distance are derived from
//! the instance on demand so they can never drift out of sync with the stops.

use crate::{Cost, DEPOT, DistanceMatrix};

/// An ordered tour for one vehicle, starting and ending at the depot.
///
/// # Examples
/// ```
/// use covend_core::{DistanceMatrix, Route};
///
/// # fn main() -> Result<(), covend_core::MatrixError> {
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0, 2, 4],
///     vec![2, 0, 1],
///     vec![4, 1, 0],
/// ])?;
/// let route = Route::new(0, vec![1, 2]);
///
/// assert_eq!(route.stops(), &[0, 1, 2, 0]);
/// assert_eq!(route.distance(&matrix), 7);
/// assert_eq!(route.load(&[0, 10, 15]), 25);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    vehicle: usize,
    stops: Vec<usize>,
}

impl Route {
    /// Construct a route visiting `customers` in order.
    ///
    /// The depot is added at both ends.
    pub fn new(vehicle: usize, customers: impl IntoIterator<Item = usize>) -> Self {
        let mut stops = vec![DEPOT];
        stops.extend(customers);
        stops.push(DEPOT);
        Self { vehicle, stops }
    }

    /// Construct a route with no customers: `[depot, depot]`.
    ///
    /// # Examples
    /// ```
    /// use covend_core::Route;
    ///
    /// let route = Route::empty(3);
    /// assert!(route.is_empty());
    /// assert_eq!(route.stops(), &[0, 0]);
    /// ```
    pub fn empty(vehicle: usize) -> Self {
        Self::new(vehicle, std::iter::empty())
    }

    /// Wrap a raw stop sequence without adding depot anchors.
    ///
    /// Used when checking externally produced sequences; see
    /// [`Solution::validate`](crate::Solution::validate).
    pub const fn from_stops(vehicle: usize, stops: Vec<usize>) -> Self {
        Self { vehicle, stops }
    }

    /// Identifier of the vehicle driving this route.
    pub const fn vehicle(&self) -> usize {
        self.vehicle
    }

    /// Full visit sequence including both depot anchors.
    pub fn stops(&self) -> &[usize] {
        &self.stops
    }

    /// Visit sequence without the depot anchors.
    pub fn customers(&self) -> &[usize] {
        match self.stops.as_slice() {
            [_, inner @ .., _] => inner,
            _ => &[],
        }
    }

    /// Whether the vehicle leaves the depot at all.
    pub fn is_empty(&self) -> bool {
        self.customers().is_empty()
    }

    /// Sum of matrix costs between consecutive stops.
    pub fn distance(&self, matrix: &DistanceMatrix) -> Cost {
        self.stops
            .windows(2)
            .filter_map(|leg| match leg {
                [from, to] => matrix.get(*from, *to),
                _ => None,
            })
            .sum()
    }

    /// Total demand collected along the route.
    pub fn load(&self, demands: &[u32]) -> u64 {
        self.running_loads(demands).last().copied().unwrap_or(0)
    }

    /// Cumulative load after each stop, including both depot anchors.
    pub fn running_loads(&self, demands: &[u32]) -> Vec<u64> {
        self.stops
            .iter()
            .scan(0_u64, |load, &stop| {
                *load += u64::from(demands.get(stop).copied().unwrap_or(0));
                Some(*load)
            })
            .collect()
    }
}
