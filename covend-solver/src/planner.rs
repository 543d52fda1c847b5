//! Composed solve entry point: sample, price, solve, report.
//!
//! [`RoutePlanner`] wires the geospatial sampler, the cost matrix builder and
//! [`CvrpSolver`] into one synchronous call. All state lives in the planner's
//! configuration; nothing is shared between calls.

use std::time::Duration;

use covend_core::{
    AnyQuota, CostMatrixBuilder, CostMatrixConfig, CostMatrixError, CostMatrixStats, Infeasibility,
    InstanceError, Point, ProblemInstance, Quota, RoadNetworkError, Sampler, SamplerConfig,
    SamplerError, Solution, SolutionReport, SolveError, Solver, TimeQuota, Unlimited, Vehicle,
    report,
};
use geo::Coord;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::{CvrpSolver, CvrpSolverConfig};

/// Default depot location: central Lima, longitude first.
pub const DEFAULT_ORIGIN: Coord<f64> = Coord {
    x: -77.0141,
    y: -12.0432,
};

/// Default minimum road network radius in metres.
pub const DEFAULT_RADIUS_M: f64 = 500.0;

/// Default per-vehicle capacity.
pub const DEFAULT_VEHICLE_CAPACITY: u32 = 550;

/// Configuration for [`RoutePlanner`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    /// Depot location and centre of the road network.
    pub origin: Coord<f64>,
    /// Minimum radius of the road network around `origin`; widened when a
    /// sampled point lies farther out.
    pub radius_m: f64,
    /// Capacity shared by every vehicle.
    pub vehicle_capacity: u32,
    /// Seed for sampling and restarts; `None` samples from entropy.
    pub seed: Option<u64>,
    /// Budget for the whole pipeline.
    pub time_limit: Option<Duration>,
    /// Cost matrix worker pool settings.
    pub cost_matrix: CostMatrixConfig,
    /// Point spread and demand range.
    pub sampler: SamplerConfig,
    /// Search settings.
    pub solver: CvrpSolverConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN,
            radius_m: DEFAULT_RADIUS_M,
            vehicle_capacity: DEFAULT_VEHICLE_CAPACITY,
            seed: None,
            time_limit: None,
            cost_matrix: CostMatrixConfig::default(),
            sampler: SamplerConfig::default(),
            solver: CvrpSolverConfig::default(),
        }
    }
}

/// Broad category of a [`PlanError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request itself was malformed.
    BadInput,
    /// The request was valid but has no capacity-respecting answer.
    NoAnswer,
    /// Data or computation failed before an answer could be produced.
    ComputeFailure,
}

/// Errors returned by [`RoutePlanner`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// Demand points could not be generated.
    #[error("failed to sample demand points")]
    Sampling(#[from] SamplerError),
    /// Travel costs could not be computed.
    #[error("failed to build the cost matrix")]
    CostMatrix(#[from] CostMatrixError),
    /// The assembled instance was invalid.
    #[error("invalid problem instance")]
    Instance(#[from] InstanceError),
    /// The solver failed or found no answer.
    #[error("solve failed")]
    Solve(#[from] SolveError),
}

impl PlanError {
    /// Classify the failure for callers.
    ///
    /// # Examples
    /// ```rust
    /// use covend_core::{Infeasibility, SolveError};
    /// use covend_solver::{FailureKind, PlanError};
    ///
    /// let err = PlanError::Solve(SolveError::Infeasible(Infeasibility::QuotaReached));
    /// assert_eq!(err.kind(), FailureKind::NoAnswer);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Sampling(_)
            | Self::Instance(_)
            | Self::Solve(SolveError::InvalidInstance(_))
            | Self::CostMatrix(
                CostMatrixError::EmptyInput
                | CostMatrixError::Network(RoadNetworkError::InvalidRadius { .. }),
            ) => FailureKind::BadInput,
            Self::Solve(SolveError::Infeasible(_)) => FailureKind::NoAnswer,
            Self::CostMatrix(_) | Self::Solve(SolveError::InvariantViolated(_)) => {
                FailureKind::ComputeFailure
            }
        }
    }

    /// The infeasibility reason, when the problem has no answer.
    #[must_use]
    pub const fn infeasibility(&self) -> Option<&Infeasibility> {
        match self {
            Self::Solve(SolveError::Infeasible(reason)) => Some(reason),
            _ => None,
        }
    }
}

/// Everything produced by one planning run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutput {
    /// Sampled points; index `0` is the depot.
    pub points: Vec<Point>,
    /// Cost matrix build statistics.
    pub stats: CostMatrixStats,
    /// Validated solver output.
    pub solution: Solution,
    /// Per-route breakdown of `solution`.
    pub report: SolutionReport,
}

/// Sample points around a depot, price them over a road network and route a
/// fleet through them.
///
/// # Examples
/// ```rust,ignore
/// use covend_data::OverpassRoadNetwork;
/// use covend_data::overpass::DEFAULT_OVERPASS_URL;
/// use covend_solver::{PlannerConfig, RoutePlanner};
///
/// let network = OverpassRoadNetwork::new(DEFAULT_OVERPASS_URL)?;
/// let planner = RoutePlanner::new(network, PlannerConfig::default());
/// let report = planner.plan(4, 40)?;
/// println!("{report}");
/// ```
#[derive(Debug, Clone)]
pub struct RoutePlanner<N> {
    network: N,
    config: PlannerConfig,
}

impl<N: covend_core::RoadNetworkService> RoutePlanner<N> {
    /// Create a planner over `network`.
    pub const fn new(network: N, config: PlannerConfig) -> Self {
        Self { network, config }
    }

    /// Active configuration.
    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Route `num_vehicles` vehicles through `num_points` sampled points,
    /// the first of which is the depot.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`]; use [`PlanError::kind`] to tell bad input from
    /// infeasible problems and compute failures.
    pub fn plan(&self, num_vehicles: usize, num_points: usize) -> Result<SolutionReport, PlanError> {
        self.plan_within(num_vehicles, num_points, &Unlimited)
            .map(|output| output.report)
    }

    /// As [`Self::plan`], bounded by `quota` as well as the configured time
    /// limit, and returning every intermediate product.
    ///
    /// # Errors
    ///
    /// See [`Self::plan`].
    pub fn plan_within(
        &self,
        num_vehicles: usize,
        num_points: usize,
        quota: &dyn Quota,
    ) -> Result<PlanOutput, PlanError> {
        let config = &self.config;
        if num_vehicles == 0 {
            return Err(InstanceError::NoVehicles.into());
        }
        if config.vehicle_capacity == 0 {
            return Err(InstanceError::ZeroCapacity { vehicle: 0 }.into());
        }
        let quota = AnyQuota(quota, config.time_limit.map(TimeQuota::new));

        let points = self.sampler().generate_instance(num_points, config.origin)?;
        log::info!("sampled {} points around {:?}", points.len(), config.origin);

        let (matrix, stats) = CostMatrixBuilder::with_config(&self.network, config.cost_matrix)
            .build_with_stats(&points, config.origin, config.radius_m, &quota)?;
        log::info!(
            "cost matrix ready: {} points, {} traversals",
            stats.points,
            stats.distinct_sources
        );

        let instance = ProblemInstance::from_points(
            &points,
            matrix,
            Vehicle::uniform_fleet(num_vehicles, config.vehicle_capacity),
        )?;
        let solution = self.solver().solve(&instance, &quota)?;
        let report = report::format(&solution, &instance);
        Ok(PlanOutput {
            points,
            stats,
            solution,
            report,
        })
    }

    fn sampler(&self) -> Sampler {
        let rng = self
            .config
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        Sampler::with_config(self.config.sampler.clone(), rng)
    }

    fn solver(&self) -> CvrpSolver {
        let mut solver = self.config.solver.clone();
        if let Some(seed) = self.config.seed {
            solver.seed = seed;
        }
        CvrpSolver::with_config(solver)
    }
}
