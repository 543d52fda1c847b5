//! Capacity-aware cheapest insertion.
//!
//! Points are inserted one at a time at the position of least marginal
//! distance across every open route with room for them. A new vehicle is
//! opened only when no open route fits; vehicles open in descending capacity
//! order so the roomiest ones absorb the largest residual demand.
//!
//! [`assigned_insertion`] routes a fixed point-to-vehicle assignment with the
//! same pricing, for plans whose packing was decided up front.

use covend_core::{Infeasibility, ProblemInstance, Quota};

use super::plan::{Delta, Plan, arc, demand_of};

/// Build a feasible plan visiting `order` in sequence.
///
/// # Errors
///
/// Returns [`Infeasibility::NoVehicleAvailable`] for the first point no
/// vehicle can hold and [`Infeasibility::QuotaReached`] when the quota runs
/// out before every point is placed.
pub(crate) fn cheapest_insertion(
    instance: &ProblemInstance,
    order: &[usize],
    quota: &dyn Quota,
) -> Result<Plan, Infeasibility> {
    let mut plan = Plan::empty(instance);
    let mut unopened = opening_order(instance).into_iter();
    let mut open: Vec<usize> = Vec::new();

    for &point in order {
        if quota.is_reached() {
            log::debug!("quota reached during construction with point {point} unrouted");
            return Err(Infeasibility::QuotaReached);
        }
        let demand = demand_of(instance, point);
        let (vehicle, position) = match best_slot(instance, &plan, &open, point, demand) {
            Some(slot) => slot,
            None => {
                let vehicle = unopened
                    .next()
                    .filter(|&vehicle| plan.fits(vehicle, demand))
                    .ok_or(Infeasibility::NoVehicleAvailable { point })?;
                log::trace!("opening vehicle {vehicle} for point {point}");
                open.push(vehicle);
                (vehicle, 0)
            }
        };
        plan.insert(vehicle, position, point, demand);
    }
    Ok(plan)
}

/// Build a plan from `(point, vehicle)` pairs, placing each point at the
/// cheapest position of its own vehicle's route.
///
/// # Errors
///
/// Returns [`Infeasibility::NoVehicleAvailable`] when a pair overloads its
/// vehicle and [`Infeasibility::QuotaReached`] when the quota runs out.
pub(crate) fn assigned_insertion(
    instance: &ProblemInstance,
    assignment: &[(usize, usize)],
    quota: &dyn Quota,
) -> Result<Plan, Infeasibility> {
    let mut plan = Plan::empty(instance);
    for &(point, vehicle) in assignment {
        if quota.is_reached() {
            return Err(Infeasibility::QuotaReached);
        }
        let demand = demand_of(instance, point);
        let (_, position) = best_slot(instance, &plan, &[vehicle], point, demand)
            .ok_or(Infeasibility::NoVehicleAvailable { point })?;
        plan.insert(vehicle, position, point, demand);
    }
    Ok(plan)
}

/// Vehicle ids by descending capacity, ties by ascending id.
fn opening_order(instance: &ProblemInstance) -> Vec<usize> {
    let mut vehicles: Vec<(u32, usize)> = instance
        .vehicles()
        .iter()
        .map(|vehicle| (vehicle.capacity, vehicle.id))
        .collect();
    vehicles.sort_by(|(cap_a, id_a), (cap_b, id_b)| cap_b.cmp(cap_a).then(id_a.cmp(id_b)));
    vehicles.into_iter().map(|(_, id)| id).collect()
}

/// Cheapest `(vehicle, position)` among open routes with room; first found on ties.
fn best_slot(
    instance: &ProblemInstance,
    plan: &Plan,
    open: &[usize],
    point: usize,
    demand: u64,
) -> Option<(usize, usize)> {
    let mut best: Option<(Delta, usize, usize)> = None;
    for &vehicle in open {
        if !plan.fits(vehicle, demand) {
            continue;
        }
        for position in 0..=plan.route(vehicle).len() {
            let prev = plan.stop(vehicle, position);
            let next = plan.stop(vehicle, position + 1);
            let delta = arc(instance, prev, point) + arc(instance, point, next)
                - arc(instance, prev, next);
            if best.is_none_or(|(known, _, _)| delta < known) {
                best = Some((delta, vehicle, position));
            }
        }
    }
    best.map(|(_, vehicle, position)| (vehicle, position))
}
