//! Solver output and its invariants.

use thiserror::Error;

use crate::{Cost, DEPOT, ProblemInstance, Route};

/// Invariant broken by a candidate [`Solution`].
///
/// Solvers check their own output with [`Solution::validate`]; a violation
/// signals a logic fault rather than an unsolvable instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolutionViolation {
    /// A route did not start and end at the depot.
    #[error("route for vehicle {vehicle} does not start and end at the depot")]
    RouteNotAnchored {
        /// Vehicle driving the route.
        vehicle: usize,
    },
    /// A route referenced a vehicle outside the fleet.
    #[error("route references unknown vehicle {vehicle}")]
    UnknownVehicle {
        /// Vehicle id found.
        vehicle: usize,
    },
    /// Two routes were assigned to the same vehicle.
    #[error("vehicle {vehicle} is assigned more than one route")]
    DuplicateVehicle {
        /// Vehicle id found twice.
        vehicle: usize,
    },
    /// A stop referenced a point outside the instance.
    #[error("route for vehicle {vehicle} visits unknown point {point}")]
    UnknownPoint {
        /// Vehicle driving the route.
        vehicle: usize,
        /// Point index found.
        point: usize,
    },
    /// The depot appeared between the anchors of a route.
    #[error("route for vehicle {vehicle} returns to the depot mid-route")]
    DepotRevisited {
        /// Vehicle driving the route.
        vehicle: usize,
    },
    /// A point was visited more than once across the solution.
    #[error("point {point} is visited more than once")]
    DuplicateVisit {
        /// Point visited twice.
        point: usize,
    },
    /// A point was never visited.
    #[error("point {point} is not visited by any route")]
    MissingPoint {
        /// Point left unserved.
        point: usize,
    },
    /// A route's running load exceeded its vehicle's capacity.
    #[error("vehicle {vehicle} carries {load} units but holds only {capacity}")]
    CapacityExceeded {
        /// Vehicle driving the route.
        vehicle: usize,
        /// Peak running load.
        load: u64,
        /// Vehicle capacity.
        capacity: u32,
    },
    /// Stored totals disagreed with the routes.
    #[error("stored totals ({distance}m, load {load}) disagree with the routes")]
    TotalsMismatch {
        /// Stored total distance.
        distance: Cost,
        /// Stored total load.
        load: u64,
    },
}

/// A set of routes together with fleet-wide totals.
///
/// Totals are computed when the solution is assembled; `feasible` is `true`
/// only when every customer is served exactly once within capacity.
///
/// # Examples
/// ```
/// use covend_core::{DistanceMatrix, ProblemInstance, Route, Solution};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let matrix = DistanceMatrix::from_rows(vec![vec![0, 3], vec![3, 0]])?;
/// let instance = ProblemInstance::with_uniform_fleet(matrix, vec![0, 4], 1, 10)?;
/// let solution = Solution::from_routes(vec![Route::new(0, vec![1])], &instance);
///
/// assert!(solution.feasible);
/// assert_eq!(solution.total_distance, 6);
/// assert_eq!(solution.total_load, 4);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// One route per vehicle, ordered by vehicle id.
    pub routes: Vec<Route>,
    /// Sum of route distances.
    pub total_distance: Cost,
    /// Sum of route loads.
    pub total_load: u64,
    /// Whether every point is served exactly once within capacity.
    pub feasible: bool,
}

impl Solution {
    /// Assemble a solution, deriving totals and feasibility from `instance`.
    pub fn from_routes(routes: Vec<Route>, instance: &ProblemInstance) -> Self {
        let total_distance = routes
            .iter()
            .map(|route| route.distance(instance.matrix()))
            .sum();
        let total_load = routes
            .iter()
            .map(|route| route.load(instance.demands()))
            .sum();
        let mut solution = Self {
            routes,
            total_distance,
            total_load,
            feasible: false,
        };
        solution.feasible = solution.check_routes(instance).is_ok();
        solution
    }

    /// Route driven by `vehicle`, if any.
    pub fn route_for(&self, vehicle: usize) -> Option<&Route> {
        self.routes.iter().find(|route| route.vehicle() == vehicle)
    }

    /// Number of routes that leave the depot.
    pub fn used_vehicles(&self) -> usize {
        self.routes.iter().filter(|route| !route.is_empty()).count()
    }

    /// Check every solution invariant against `instance`.
    ///
    /// Verifies depot anchoring, exactly-once coverage of every customer,
    /// the running load of every route against its vehicle's capacity, the
    /// stored totals and the `feasible` flag.
    ///
    /// # Errors
    ///
    /// Returns the first [`SolutionViolation`] encountered.
    pub fn validate(&self, instance: &ProblemInstance) -> Result<(), SolutionViolation> {
        self.check_routes(instance)?;
        let expected = Self::from_routes(self.routes.clone(), instance);
        if expected.total_distance != self.total_distance
            || expected.total_load != self.total_load
            || !self.feasible
        {
            return Err(SolutionViolation::TotalsMismatch {
                distance: self.total_distance,
                load: self.total_load,
            });
        }
        Ok(())
    }

    fn check_routes(&self, instance: &ProblemInstance) -> Result<(), SolutionViolation> {
        let mut vehicle_seen = vec![false; instance.num_vehicles()];
        let mut visited = vec![false; instance.num_points()];
        for route in &self.routes {
            let vehicle_id = route.vehicle();
            let vehicle = instance
                .vehicles()
                .get(vehicle_id)
                .ok_or(SolutionViolation::UnknownVehicle {
                    vehicle: vehicle_id,
                })?;
            match vehicle_seen.get_mut(vehicle_id) {
                Some(seen) if *seen => {
                    return Err(SolutionViolation::DuplicateVehicle {
                        vehicle: vehicle_id,
                    });
                }
                Some(seen) => *seen = true,
                None => {
                    return Err(SolutionViolation::UnknownVehicle {
                        vehicle: vehicle_id,
                    });
                }
            }
            check_anchors(route)?;
            for &point in route.customers() {
                if point == DEPOT {
                    return Err(SolutionViolation::DepotRevisited {
                        vehicle: vehicle_id,
                    });
                }
                match visited.get_mut(point) {
                    None => {
                        return Err(SolutionViolation::UnknownPoint {
                            vehicle: vehicle_id,
                            point,
                        });
                    }
                    Some(flag) if *flag => return Err(SolutionViolation::DuplicateVisit { point }),
                    Some(flag) => *flag = true,
                }
            }
            let peak = route
                .running_loads(instance.demands())
                .into_iter()
                .max()
                .unwrap_or(0);
            if peak > u64::from(vehicle.capacity) {
                return Err(SolutionViolation::CapacityExceeded {
                    vehicle: vehicle_id,
                    load: peak,
                    capacity: vehicle.capacity,
                });
            }
        }
        if let Some(point) = instance
            .customers()
            .find(|&point| !visited.get(point).copied().unwrap_or(false))
        {
            return Err(SolutionViolation::MissingPoint { point });
        }
        Ok(())
    }
}

fn check_anchors(route: &Route) -> Result<(), SolutionViolation> {
    match route.stops() {
        [DEPOT, .., DEPOT] => Ok(()),
        _ => Err(SolutionViolation::RouteNotAnchored {
            vehicle: route.vehicle(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DistanceMatrix, Vehicle};
    use rstest::{fixture, rstest};

    #[fixture]
    fn instance() -> ProblemInstance {
        let matrix = DistanceMatrix::from_rows(vec![
            vec![0, 2, 3, 4],
            vec![2, 0, 1, 5],
            vec![3, 1, 0, 2],
            vec![4, 5, 2, 0],
        ])
        .expect("valid matrix");
        ProblemInstance::new(
            matrix,
            vec![0, 4, 5, 6],
            vec![Vehicle::new(0, 10), Vehicle::new(1, 10)],
        )
        .expect("valid instance")
    }

    #[rstest]
    fn accepts_covering_solution(instance: ProblemInstance) {
        let solution = Solution::from_routes(
            vec![Route::new(0, vec![1, 2]), Route::new(1, vec![3])],
            &instance,
        );
        assert!(solution.feasible);
        assert_eq!(solution.total_distance, 6 + 8);
        assert_eq!(solution.total_load, 15);
        assert_eq!(solution.used_vehicles(), 2);
        assert_eq!(solution.validate(&instance), Ok(()));
    }

    #[rstest]
    #[case(
        vec![Route::new(0, vec![1, 2, 3])],
        SolutionViolation::CapacityExceeded { vehicle: 0, load: 15, capacity: 10 }
    )]
    #[case(
        vec![Route::new(0, vec![1, 2])],
        SolutionViolation::MissingPoint { point: 3 }
    )]
    #[case(
        vec![Route::new(0, vec![1, 2]), Route::new(1, vec![3, 1])],
        SolutionViolation::DuplicateVisit { point: 1 }
    )]
    #[case(
        vec![Route::new(0, vec![1, 0, 2]), Route::new(1, vec![3])],
        SolutionViolation::DepotRevisited { vehicle: 0 }
    )]
    #[case(
        vec![Route::from_stops(0, vec![1, 2, 0]), Route::new(1, vec![3])],
        SolutionViolation::RouteNotAnchored { vehicle: 0 }
    )]
    #[case(
        vec![Route::new(0, vec![1, 2]), Route::new(0, vec![3])],
        SolutionViolation::DuplicateVehicle { vehicle: 0 }
    )]
    #[case(
        vec![Route::new(4, vec![1, 2, 3])],
        SolutionViolation::UnknownVehicle { vehicle: 4 }
    )]
    #[case(
        vec![Route::new(0, vec![1, 2, 9])],
        SolutionViolation::UnknownPoint { vehicle: 0, point: 9 }
    )]
    fn rejects_broken_solutions(
        instance: ProblemInstance,
        #[case] routes: Vec<Route>,
        #[case] expected: SolutionViolation,
    ) {
        let solution = Solution::from_routes(routes, &instance);
        assert!(!solution.feasible);
        assert_eq!(solution.validate(&instance), Err(expected));
    }

    #[rstest]
    fn detects_tampered_totals(instance: ProblemInstance) {
        let mut solution = Solution::from_routes(
            vec![Route::new(0, vec![1, 2]), Route::new(1, vec![3])],
            &instance,
        );
        solution.total_distance = 1;
        assert!(matches!(
            solution.validate(&instance),
            Err(SolutionViolation::TotalsMismatch { distance: 1, .. })
        ));
    }
}
