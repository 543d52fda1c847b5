//! `CvrpSolver`: precondition check, cheapest-insertion construction and
//! best-improvement local search.
//!
//! Each restart builds and improves its own plan. Restarts run on the rayon
//! global pool and the cheapest result wins, ties going to the lowest
//! restart index, so the outcome does not depend on thread scheduling.
//!
//! When a restart's insertion order runs out of vehicles, construction is
//! retried largest demand first and then handed to an exact packing search.
//! `NoVehicleAvailable` is reported only once that search proves no
//! capacity-respecting assignment exists, or gives up on its budget.

use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;

use covend_core::{
    AnyQuota, Infeasibility, ProblemInstance, Quota, Solution, SolveError, Solver, TimeQuota,
};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

mod construction;
mod local_search;
mod packing;
mod plan;
mod precheck;

use local_search::Stop;
use packing::Packing;
use plan::Plan;

/// Configuration for [`CvrpSolver`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CvrpSolverConfig {
    /// Wall-clock budget for the whole solve, combined with the caller's quota.
    pub time_limit: Option<Duration>,
    /// Upper bound on improving moves applied per restart.
    pub max_iterations: usize,
    /// Number of independent construction and search runs.
    pub restarts: NonZeroUsize,
    /// Seed for the construction order of restarts after the first.
    pub seed: u64,
}

impl Default for CvrpSolverConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            max_iterations: 10_000,
            restarts: NonZeroUsize::MIN,
            seed: 0,
        }
    }
}

/// Lifecycle of a single solve, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Unsolved,
    Constructing,
    Improving,
    Solved,
    Infeasible,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unsolved => "unsolved",
            Self::Constructing => "constructing",
            Self::Improving => "improving",
            Self::Solved => "solved",
            Self::Infeasible => "infeasible",
        };
        f.write_str(name)
    }
}

fn transition(restart: usize, from: Phase, to: Phase) {
    log::debug!("restart {restart}: {from} -> {to}");
}

/// Native capacitated vehicle routing solver.
///
/// The solver holds only configuration; every call to [`Solver::solve`] is
/// independent and never mutates the instance.
///
/// # Examples
///
/// ```rust
/// use covend_core::{DistanceMatrix, ProblemInstance, Solver, Unlimited};
/// use covend_solver::CvrpSolver;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0, 4, 6],
///     vec![4, 0, 3],
///     vec![6, 3, 0],
/// ])?;
/// let instance = ProblemInstance::with_uniform_fleet(matrix, vec![0, 20, 30], 2, 60)?;
/// let solution = CvrpSolver::default().solve(&instance, &Unlimited)?;
/// assert!(solution.feasible);
/// assert_eq!(solution.total_distance, 13);
/// assert_eq!(solution.total_load, 50);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CvrpSolver {
    config: CvrpSolverConfig,
}

impl CvrpSolver {
    /// Construct a solver with explicit configuration.
    pub const fn with_config(config: CvrpSolverConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub const fn config(&self) -> &CvrpSolverConfig {
        &self.config
    }

    fn run(
        &self,
        instance: &ProblemInstance,
        restart: usize,
        quota: &dyn Quota,
    ) -> Result<Solution, Infeasibility> {
        transition(restart, Phase::Unsolved, Phase::Constructing);
        let mut plan = self.construct(instance, restart, quota).inspect_err(|err| {
            log::debug!("restart {restart}: construction failed: {err}");
            transition(restart, Phase::Constructing, Phase::Infeasible);
        })?;
        transition(restart, Phase::Constructing, Phase::Improving);
        let constructed = plan.distance(instance);
        let summary = local_search::improve(instance, &mut plan, self.config.max_iterations, quota);
        if summary.stop == Stop::QuotaReached {
            log::info!("restart {restart}: quota reached, keeping best plan so far");
        }
        log::debug!(
            "restart {restart}: {} improving moves ({constructed} -> {}), stopped: {:?}",
            summary.moves,
            plan.distance(instance),
            summary.stop
        );
        transition(restart, Phase::Improving, Phase::Solved);
        Ok(plan.into_solution(instance))
    }

    /// Greedy insertion in the restart's order, then largest demand first,
    /// then an exact packing routed by cheapest insertion.
    fn construct(
        &self,
        instance: &ProblemInstance,
        restart: usize,
        quota: &dyn Quota,
    ) -> Result<Plan, Infeasibility> {
        let order = construction_order(instance, self.config.seed, restart);
        let dead_end = match construction::cheapest_insertion(instance, &order, quota) {
            Err(err @ Infeasibility::NoVehicleAvailable { .. }) => err,
            decided => return decided,
        };
        log::debug!("restart {restart}: {dead_end}; retrying largest demand first");
        let decreasing = packing::decreasing_demand_order(instance);
        match construction::cheapest_insertion(instance, &decreasing, quota) {
            Err(Infeasibility::NoVehicleAvailable { .. }) => {}
            decided => return decided,
        }
        match packing::pack(instance, quota) {
            Packing::Found(assignment) => {
                log::debug!("restart {restart}: routing an exact packing");
                construction::assigned_insertion(instance, &assignment, quota)
            }
            Packing::Impossible => Err(dead_end),
            Packing::Undecided if quota.is_reached() => Err(Infeasibility::QuotaReached),
            Packing::Undecided => {
                log::warn!(
                    "packing search budget of {} nodes exhausted; reporting {dead_end} unproven",
                    packing::NODE_BUDGET
                );
                Err(dead_end)
            }
        }
    }
}

/// Ascending indices for restart 0, a seeded shuffle afterwards.
fn construction_order(instance: &ProblemInstance, seed: u64, restart: usize) -> Vec<usize> {
    let mut order: Vec<usize> = instance.customers().collect();
    if restart > 0 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(restart as u64));
        order.shuffle(&mut rng);
    }
    order
}

impl Solver for CvrpSolver {
    fn solve(&self, instance: &ProblemInstance, quota: &dyn Quota) -> Result<Solution, SolveError> {
        precheck::check(instance).inspect_err(|err| {
            log::info!("instance rejected before search: {err}");
        })?;
        let quota = AnyQuota(quota, self.config.time_limit.map(TimeQuota::new));
        let restarts = self.config.restarts.get();

        let outcomes: Vec<Result<Solution, Infeasibility>> = (0..restarts)
            .into_par_iter()
            .map(|restart| self.run(instance, restart, &quota))
            .collect();

        let mut best: Option<Solution> = None;
        let mut first_error: Option<Infeasibility> = None;
        for outcome in outcomes {
            match outcome {
                Ok(solution) => {
                    if best
                        .as_ref()
                        .is_none_or(|known| solution.total_distance < known.total_distance)
                    {
                        best = Some(solution);
                    }
                }
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        let Some(solution) = best else {
            return Err(first_error.unwrap_or(Infeasibility::QuotaReached).into());
        };
        solution
            .validate(instance)
            .map_err(SolveError::InvariantViolated)?;
        log::info!(
            "solved {} points with {} of {} vehicles, total distance {}m",
            instance.num_points().saturating_sub(1),
            solution.used_vehicles(),
            instance.num_vehicles(),
            solution.total_distance
        );
        Ok(solution)
    }
}
