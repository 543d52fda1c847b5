//! Mutable working state shared by construction and local search.

use covend_core::{DEPOT, ProblemInstance, Route, Solution};

/// Signed cost change of a move, in metres.
pub(crate) type Delta = i128;

/// Customer sequences and loads for every vehicle, indexed by vehicle id.
///
/// Sequences exclude the depot anchors; [`Plan::stop`] exposes the anchored
/// view without allocating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Plan {
    pub(crate) routes: Vec<Vec<usize>>,
    pub(crate) loads: Vec<u64>,
    pub(crate) capacities: Vec<u64>,
}

impl Plan {
    /// Empty routes for every vehicle in `instance`.
    pub(crate) fn empty(instance: &ProblemInstance) -> Self {
        let capacities: Vec<u64> = instance.vehicle_capacities().map(u64::from).collect();
        Self {
            routes: vec![Vec::new(); capacities.len()],
            loads: vec![0; capacities.len()],
            capacities,
        }
    }

    /// Anchored stop at `position`: `0` and `len + 1` are the depot.
    pub(crate) fn stop(&self, vehicle: usize, position: usize) -> usize {
        stop_in(self.route(vehicle), position)
    }

    pub(crate) fn route(&self, vehicle: usize) -> &[usize] {
        self.routes.get(vehicle).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn load(&self, vehicle: usize) -> u64 {
        self.loads.get(vehicle).copied().unwrap_or(0)
    }

    pub(crate) fn capacity(&self, vehicle: usize) -> u64 {
        self.capacities.get(vehicle).copied().unwrap_or(0)
    }

    /// Whether `vehicle` can take `extra` more units.
    pub(crate) fn fits(&self, vehicle: usize, extra: u64) -> bool {
        self.load(vehicle).saturating_add(extra) <= self.capacity(vehicle)
    }

    /// Insert `point` into `vehicle`'s route before customer `position`.
    pub(crate) fn insert(&mut self, vehicle: usize, position: usize, point: usize, demand: u64) {
        if let (Some(route), Some(load)) = (self.routes.get_mut(vehicle), self.loads.get_mut(vehicle))
        {
            route.insert(position.min(route.len()), point);
            *load = load.saturating_add(demand);
        }
    }

    /// Remove and return the customer at `position` of `vehicle`'s route.
    pub(crate) fn remove(&mut self, vehicle: usize, position: usize, demand: u64) -> Option<usize> {
        let route = self.routes.get_mut(vehicle)?;
        if position >= route.len() {
            return None;
        }
        let point = route.remove(position);
        if let Some(load) = self.loads.get_mut(vehicle) {
            *load = load.saturating_sub(demand);
        }
        Some(point)
    }

    /// Total distance of every route.
    pub(crate) fn distance(&self, instance: &ProblemInstance) -> u64 {
        (0..self.routes.len())
            .map(|vehicle| {
                let len = self.route(vehicle).len();
                (0..=len)
                    .map(|pos| {
                        instance
                            .matrix()
                            .get(self.stop(vehicle, pos), self.stop(vehicle, pos + 1))
                            .unwrap_or(0)
                    })
                    .sum::<u64>()
            })
            .sum()
    }

    /// Convert into a [`Solution`] with one route per vehicle.
    pub(crate) fn into_solution(self, instance: &ProblemInstance) -> Solution {
        let routes = self
            .routes
            .into_iter()
            .enumerate()
            .map(|(vehicle, customers)| Route::new(vehicle, customers))
            .collect();
        Solution::from_routes(routes, instance)
    }
}

/// Anchored stop of a raw customer sequence.
pub(crate) fn stop_in(route: &[usize], position: usize) -> usize {
    position
        .checked_sub(1)
        .and_then(|idx| route.get(idx))
        .copied()
        .unwrap_or(DEPOT)
}

/// Matrix cost from `from` to `to` as a signed delta operand.
pub(crate) fn arc(instance: &ProblemInstance, from: usize, to: usize) -> Delta {
    Delta::from(instance.matrix().get(from, to).unwrap_or(0))
}

/// Demand of `point` widened for load arithmetic.
pub(crate) fn demand_of(instance: &ProblemInstance, point: usize) -> u64 {
    u64::from(instance.demand(point))
}
