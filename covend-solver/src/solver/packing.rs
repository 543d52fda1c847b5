//! Exact assignment of customer demands to vehicles, ignoring distance.
//!
//! Greedy construction can hit a packing dead end on instances that do have a
//! capacity-respecting assignment. This depth-first search settles the
//! question: it either finds an assignment, proves none exists, or gives up
//! once its node budget or the quota runs out.

use covend_core::{ProblemInstance, Quota};

use super::plan::demand_of;

/// Search nodes visited before the search gives up.
pub(crate) const NODE_BUDGET: usize = 200_000;

/// Result of [`pack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Packing {
    /// `(point, vehicle)` pairs, largest demand first.
    Found(Vec<(usize, usize)>),
    /// No assignment respects every capacity.
    Impossible,
    /// The budget or quota ran out before the search finished.
    Undecided,
}

/// Customers by descending demand, ties by ascending index.
pub(crate) fn decreasing_demand_order(instance: &ProblemInstance) -> Vec<usize> {
    let mut order: Vec<usize> = instance.customers().collect();
    order.sort_by(|&a, &b| {
        instance
            .demand(b)
            .cmp(&instance.demand(a))
            .then(a.cmp(&b))
    });
    order
}

/// Assign every customer of `instance` to a vehicle with room for it.
pub(crate) fn pack(instance: &ProblemInstance, quota: &dyn Quota) -> Packing {
    let order = decreasing_demand_order(instance);
    let items: Vec<u64> = order.iter().map(|&point| demand_of(instance, point)).collect();
    let mut residual: Vec<u64> = instance.vehicle_capacities().map(u64::from).collect();
    let mut chosen = Vec::with_capacity(items.len());
    let mut search = Search { quota, nodes: 0 };
    match search.place(&items, &mut residual, &mut chosen) {
        Some(true) => Packing::Found(order.into_iter().zip(chosen).collect()),
        Some(false) => Packing::Impossible,
        None => {
            log::debug!("packing search stopped after {} nodes", search.nodes);
            Packing::Undecided
        }
    }
}

struct Search<'a> {
    quota: &'a dyn Quota,
    nodes: usize,
}

impl Search<'_> {
    /// `Some(true)` once every item is placed, `Some(false)` when no branch
    /// fits and `None` when the search stopped early.
    fn place(
        &mut self,
        items: &[u64],
        residual: &mut [u64],
        chosen: &mut Vec<usize>,
    ) -> Option<bool> {
        let Some((&demand, rest)) = items.split_first() else {
            return Some(true);
        };
        self.nodes = self.nodes.saturating_add(1);
        if self.nodes > NODE_BUDGET || self.quota.is_reached() {
            return None;
        }
        let still_needed = items.iter().sum::<u64>();
        if residual.iter().sum::<u64>() < still_needed {
            return Some(false);
        }

        // Vehicles with equal room are interchangeable for the items left.
        let mut tried: Vec<u64> = Vec::new();
        for vehicle in 0..residual.len() {
            let Some(room) = residual.get(vehicle).copied() else {
                continue;
            };
            if room < demand || tried.contains(&room) {
                continue;
            }
            tried.push(room);
            set(residual, vehicle, room.saturating_sub(demand));
            chosen.push(vehicle);
            match self.place(rest, residual, chosen) {
                Some(false) => {}
                decided => return decided,
            }
            chosen.pop();
            set(residual, vehicle, room);
        }
        Some(false)
    }
}

fn set(residual: &mut [u64], vehicle: usize, room: u64) {
    if let Some(slot) = residual.get_mut(vehicle) {
        *slot = room;
    }
}
