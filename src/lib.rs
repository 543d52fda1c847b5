//! Facade crate for the covend routing engine.
//!
//! This crate re-exports the core domain types and the planner, and exposes
//! the OpenStreetMap road network services behind the `osm` feature.

#![forbid(unsafe_code)]

pub use covend_core::{
    Cost, CostMatrixBuilder, CostMatrixConfig, DistanceMatrix, Infeasibility, Point,
    ProblemInstance, Quota, RoadGraph, RoadNetworkError, RoadNetworkService, Route, Sampler,
    SamplerConfig, Solution, SolutionReport, SolveError, Solver, Vehicle,
};
pub use covend_solver::{
    CvrpSolver, CvrpSolverConfig, FailureKind, PlanError, PlannerConfig, RoutePlanner,
};

#[cfg(feature = "osm")]
pub use covend_data::{OsmPbfRoadNetwork, OverpassConfig, OverpassRoadNetwork};
