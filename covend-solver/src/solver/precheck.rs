//! Fast rejection of instances that cannot have a feasible solution.

use covend_core::{Infeasibility, ProblemInstance};

/// Reject instances that are infeasible by construction.
///
/// Checks run in a fixed order: any single demand above every capacity, then
/// total demand above total fleet capacity. The second check is necessary but
/// not sufficient; construction may still fail on bin-packing grounds.
pub(crate) fn check(instance: &ProblemInstance) -> Result<(), Infeasibility> {
    let max_capacity = instance.max_capacity();
    if let Some(point) = instance
        .customers()
        .find(|&point| instance.demand(point) > max_capacity)
    {
        return Err(Infeasibility::DemandExceedsCapacity {
            point,
            demand: instance.demand(point),
            max_capacity,
        });
    }
    let total_demand = instance.total_demand();
    let total_capacity = instance.total_capacity();
    if total_demand > total_capacity {
        return Err(Infeasibility::FleetCapacityExceeded {
            total_demand,
            total_capacity,
        });
    }
    Ok(())
}
