//! Core domain types for the covend routing engine.
//!
//! The crate models a single-depot Capacitated Vehicle Routing Problem
//! (CVRP): synthetic demand points, a road-network backed cost matrix and the
//! routes that serve them. Constructors return `Result` to surface invalid
//! input early, and every boundary to the outside world is a trait so that
//! tests can substitute deterministic doubles.
//!
//! Data flows strictly downward: [`Sampler`] → [`CostMatrixBuilder`] →
//! [`Solver`] → [`report::format`]. The [`RoadNetworkService`] is consumed by
//! the cost matrix builder only.

pub mod cost_matrix;
pub mod instance;
pub mod matrix;
pub mod network;
pub mod point;
pub mod quota;
pub mod report;
pub mod route;
pub mod sampler;
pub mod solution;
pub mod solver;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod vehicle;

pub use cost_matrix::{
    COVERAGE_MARGIN_M, CostMatrixBuilder, CostMatrixConfig, CostMatrixError, CostMatrixStats,
    covering_radius, matrix_from_graph,
};
pub use instance::{DEPOT, InstanceError, ProblemInstance};
pub use matrix::{Cost, DistanceMatrix, MatrixError};
pub use network::{
    NodeId, RoadGraph, RoadGraphBuilder, RoadNetworkError, RoadNetworkService, RoadNode,
};
pub use point::Point;
pub use quota::{AnyQuota, CancelFlag, Quota, TimeQuota, Unlimited};
pub use report::{RouteReport, SolutionReport, StopReport};
pub use route::Route;
pub use sampler::{Sampler, SamplerConfig, SamplerError, generate_instance};
pub use solution::{Solution, SolutionViolation};
pub use solver::{Infeasibility, SolveError, Solver};
pub use vehicle::Vehicle;
