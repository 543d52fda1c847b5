use thiserror::Error;

use crate::{InstanceError, ProblemInstance, Quota, Solution, SolutionViolation};

/// Why an instance has no capacity-respecting solution.
///
/// Infeasibility is a valid answer about the problem, not a fault in the
/// solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Infeasibility {
    /// A single point needs more than any vehicle can carry.
    #[error("point {point} demands {demand} units but the largest vehicle holds {max_capacity}")]
    DemandExceedsCapacity {
        /// Offending point.
        point: usize,
        /// Its demand.
        demand: u32,
        /// Largest capacity in the fleet.
        max_capacity: u32,
    },
    /// The fleet cannot carry the combined demand.
    #[error("total demand {total_demand} exceeds total fleet capacity {total_capacity}")]
    FleetCapacityExceeded {
        /// Sum of all demands.
        total_demand: u64,
        /// Sum of all capacities.
        total_capacity: u64,
    },
    /// Construction ran out of vehicles while a point was still unrouted.
    #[error("no vehicle has room for point {point}")]
    NoVehicleAvailable {
        /// First point that could not be placed.
        point: usize,
    },
    /// The quota ran out before any feasible solution was built.
    #[error("quota reached before a feasible solution was constructed")]
    QuotaReached,
}

/// Errors returned by [`Solver::solve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// The instance itself is malformed.
    #[error("invalid problem instance")]
    InvalidInstance(#[from] InstanceError),
    /// No capacity-respecting assignment exists or could be found.
    #[error("instance is infeasible")]
    Infeasible(#[from] Infeasibility),
    /// The solver produced output that breaks a solution invariant.
    ///
    /// This is a logic fault and is never reported as [`SolveError::Infeasible`].
    #[error("solver produced an invalid solution")]
    InvariantViolated(#[source] SolutionViolation),
}

/// Route a fleet through a [`ProblemInstance`].
///
/// Implementations must not mutate the instance, must validate their output
/// with [`Solution::validate`] before returning it, and must return the best
/// feasible solution found so far once `quota` is reached.
/// Solvers must be `Send + Sync` to operate safely across threads.
///
/// # Examples
///
/// ```rust
/// use covend_core::{DistanceMatrix, ProblemInstance, Quota, Route, Solution, SolveError, Solver, Unlimited};
///
/// struct OneTrip;
///
/// impl Solver for OneTrip {
///     fn solve(&self, instance: &ProblemInstance, _quota: &dyn Quota) -> Result<Solution, SolveError> {
///         let solution = Solution::from_routes(vec![Route::new(0, instance.customers())], instance);
///         solution.validate(instance).map_err(SolveError::InvariantViolated)?;
///         Ok(solution)
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let matrix = DistanceMatrix::from_rows(vec![vec![0, 1], vec![1, 0]])?;
/// let instance = ProblemInstance::with_uniform_fleet(matrix, vec![0, 5], 1, 10)?;
/// let solution = OneTrip.solve(&instance, &Unlimited)?;
/// assert!(solution.feasible);
/// # Ok(())
/// # }
/// ```
pub trait Solver: Send + Sync {
    /// Solve `instance` within `quota`.
    fn solve(&self, instance: &ProblemInstance, quota: &dyn Quota) -> Result<Solution, SolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DistanceMatrix, Route, Unlimited};
    use rstest::rstest;

    struct SkipEverything;

    impl Solver for SkipEverything {
        fn solve(
            &self,
            instance: &ProblemInstance,
            _quota: &dyn Quota,
        ) -> Result<Solution, SolveError> {
            let solution = Solution::from_routes(vec![Route::empty(0)], instance);
            solution
                .validate(instance)
                .map_err(SolveError::InvariantViolated)?;
            Ok(solution)
        }
    }

    #[rstest]
    fn invalid_output_is_a_fault_not_infeasibility() {
        let matrix = DistanceMatrix::from_rows(vec![vec![0, 1], vec![1, 0]]).expect("matrix");
        let instance =
            ProblemInstance::with_uniform_fleet(matrix, vec![0, 5], 1, 10).expect("instance");
        let err = SkipEverything
            .solve(&instance, &Unlimited)
            .expect_err("missing point");
        assert_eq!(
            err,
            SolveError::InvariantViolated(SolutionViolation::MissingPoint { point: 1 })
        );
    }

    #[rstest]
    fn infeasibility_converts_into_solve_error() {
        let err: SolveError = Infeasibility::QuotaReached.into();
        assert!(matches!(err, SolveError::Infeasible(_)));
    }
}
