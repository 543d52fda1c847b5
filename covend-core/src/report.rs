//! Route-by-route breakdowns of a [`Solution`].
//!
//! [`format`] is a pure function: the same solution always yields the same
//! report. Printing and persistence are left to callers, which can use the
//! [`Display`](std::fmt::Display) implementation for a console layout or
//! serialise the structure.

use std::fmt;

use crate::{Cost, ProblemInstance, Solution};

/// A visit and the vehicle's load after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopReport {
    /// Point index visited.
    pub point: usize,
    /// Cumulative load after serving the point.
    pub load: u64,
}

/// Breakdown of one vehicle's route.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteReport {
    /// Vehicle driving the route.
    pub vehicle: usize,
    /// Visits in order, including both depot anchors.
    pub stops: Vec<StopReport>,
    /// Route distance in metres.
    pub distance: Cost,
    /// Total load collected.
    pub load: u64,
}

/// Breakdown of every route plus fleet-wide totals.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolutionReport {
    /// One entry per route, in solution order.
    pub routes: Vec<RouteReport>,
    /// Sum of route distances in metres.
    pub total_distance: Cost,
    /// Sum of route loads.
    pub total_load: u64,
}

/// Build the report for `solution` using the matrix and demands of `instance`.
///
/// # Examples
/// ```
/// use covend_core::{DistanceMatrix, ProblemInstance, Route, Solution, report};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let matrix = DistanceMatrix::from_rows(vec![vec![0, 5], vec![5, 0]])?;
/// let instance = ProblemInstance::with_uniform_fleet(matrix, vec![0, 30], 1, 50)?;
/// let solution = Solution::from_routes(vec![Route::new(0, vec![1])], &instance);
///
/// let summary = report::format(&solution, &instance);
/// assert_eq!(summary.total_distance, 10);
/// assert_eq!(summary.routes[0].stops[1].load, 30);
/// assert!(summary.to_string().starts_with("Route for vehicle 0:\n"));
/// # Ok(())
/// # }
/// ```
pub fn format(solution: &Solution, instance: &ProblemInstance) -> SolutionReport {
    let routes: Vec<RouteReport> = solution
        .routes
        .iter()
        .map(|route| {
            let loads = route.running_loads(instance.demands());
            let stops = route
                .stops()
                .iter()
                .zip(&loads)
                .map(|(&point, &load)| StopReport { point, load })
                .collect();
            RouteReport {
                vehicle: route.vehicle(),
                stops,
                distance: route.distance(instance.matrix()),
                load: loads.last().copied().unwrap_or(0),
            }
        })
        .collect();
    SolutionReport {
        total_distance: routes.iter().map(|r| r.distance).sum(),
        total_load: routes.iter().map(|r| r.load).sum(),
        routes,
    }
}

impl fmt::Display for RouteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Route for vehicle {}:", self.vehicle)?;
        if let Some((last, leading)) = self.stops.split_last() {
            for stop in leading {
                write!(f, " {} Load({}) -> ", stop.point, stop.load)?;
            }
            writeln!(f, " {} Load({})", last.point, last.load)?;
        }
        writeln!(f, "Distance of the route: {}m", self.distance)?;
        writeln!(f, "Load of the route: {}", self.load)
    }
}

impl fmt::Display for SolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for route in &self.routes {
            writeln!(f, "{route}")?;
        }
        writeln!(f, "Total cost for all routes: {}m", self.total_distance)?;
        writeln!(f, "Total load of all routes: {}", self.total_load)
    }
}
