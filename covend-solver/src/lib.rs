//! Native capacitated vehicle routing for covend.
//!
//! This crate provides [`CvrpSolver`], the default implementation of the
//! [`Solver`](covend_core::Solver) trait, and [`RoutePlanner`], which composes
//! the sampler, cost matrix builder, solver and reporter into one call.
//!
//! The solver is a two-phase heuristic: capacity-aware cheapest insertion
//! builds a feasible plan, then best-improvement local search (2-opt,
//! relocate and swap) shortens it without breaking capacity. Optional
//! restarts with shuffled construction orders run in parallel and the
//! cheapest result wins deterministically.

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod planner;
mod solver;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use planner::{
    DEFAULT_ORIGIN, DEFAULT_RADIUS_M, DEFAULT_VEHICLE_CAPACITY, FailureKind, PlanError, PlanOutput,
    PlannerConfig, RoutePlanner,
};
pub use solver::{CvrpSolver, CvrpSolverConfig};
