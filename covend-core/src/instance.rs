//! The immutable input bundle handed to a solver.

use std::ops::Range;

use thiserror::Error;

use crate::{DistanceMatrix, Point, Vehicle};

/// Index of the depot in every instance.
pub const DEPOT: usize = 0;

/// Errors returned when assembling a [`ProblemInstance`].
///
/// These represent bad input: counts, capacities or shapes that make the
/// bundle meaningless regardless of any routing decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstanceError {
    /// The matrix had no rows.
    #[error("problem instance requires at least the depot")]
    Empty,
    /// The demand vector length did not match the matrix size.
    #[error("{demands} demands supplied for a {locations}-point distance matrix")]
    DemandCountMismatch {
        /// Number of demand entries.
        demands: usize,
        /// Number of matrix rows.
        locations: usize,
    },
    /// The depot carried a demand.
    #[error("depot demand must be 0, found {demand}")]
    DepotDemand {
        /// Demand found at index 0.
        demand: u32,
    },
    /// The fleet was empty.
    #[error("at least one vehicle is required")]
    NoVehicles,
    /// A vehicle had zero capacity.
    #[error("vehicle {vehicle} has zero capacity")]
    ZeroCapacity {
        /// Offending vehicle id.
        vehicle: usize,
    },
    /// A point's coordinate was NaN or infinite.
    #[error("point {point} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Offending point index.
        point: usize,
    },
    /// Vehicle ids were not `0..n` in order.
    #[error("vehicle at position {position} has id {id}; ids must match fleet positions")]
    VehicleIdMismatch {
        /// Position in the fleet.
        position: usize,
        /// Id carried by the vehicle.
        id: usize,
    },
}

/// Distance matrix, demands and fleet for a single solve.
///
/// Built once per solve invocation and never mutated afterwards; accessors
/// hand out shared references only.
///
/// # Examples
/// ```
/// use covend_core::{DistanceMatrix, ProblemInstance, Vehicle};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let matrix = DistanceMatrix::from_rows(vec![
///     vec![0, 4, 6],
///     vec![4, 0, 3],
///     vec![6, 3, 0],
/// ])?;
/// let instance = ProblemInstance::new(matrix, vec![0, 20, 30], Vehicle::uniform_fleet(1, 100))?;
/// assert_eq!(instance.total_demand(), 50);
/// assert_eq!(instance.customers(), 1..3);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProblemInstance {
    matrix: DistanceMatrix,
    demands: Vec<u32>,
    vehicles: Vec<Vehicle>,
}

impl ProblemInstance {
    /// Validate and assemble an instance.
    pub fn new(
        matrix: DistanceMatrix,
        demands: Vec<u32>,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, InstanceError> {
        if matrix.size() == 0 {
            return Err(InstanceError::Empty);
        }
        if demands.len() != matrix.size() {
            return Err(InstanceError::DemandCountMismatch {
                demands: demands.len(),
                locations: matrix.size(),
            });
        }
        if let Some(&demand) = demands.get(DEPOT)
            && demand != 0
        {
            return Err(InstanceError::DepotDemand { demand });
        }
        if vehicles.is_empty() {
            return Err(InstanceError::NoVehicles);
        }
        for (position, vehicle) in vehicles.iter().enumerate() {
            if vehicle.id != position {
                return Err(InstanceError::VehicleIdMismatch {
                    position,
                    id: vehicle.id,
                });
            }
            if vehicle.capacity == 0 {
                return Err(InstanceError::ZeroCapacity {
                    vehicle: vehicle.id,
                });
            }
        }
        Ok(Self {
            matrix,
            demands,
            vehicles,
        })
    }

    /// Assemble an instance whose `num_vehicles` vehicles share `capacity`.
    pub fn with_uniform_fleet(
        matrix: DistanceMatrix,
        demands: Vec<u32>,
        num_vehicles: usize,
        capacity: u32,
    ) -> Result<Self, InstanceError> {
        Self::new(
            matrix,
            demands,
            Vehicle::uniform_fleet(num_vehicles, capacity),
        )
    }

    /// Assemble an instance from sampled points.
    ///
    /// Point order defines matrix indices; the first point is the depot.
    pub fn from_points(
        points: &[Point],
        matrix: DistanceMatrix,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, InstanceError> {
        if let Some(point) = points
            .iter()
            .position(|p| !p.location.x.is_finite() || !p.location.y.is_finite())
        {
            return Err(InstanceError::NonFiniteCoordinate { point });
        }
        let demands = points.iter().map(|point| point.demand).collect();
        Self::new(matrix, demands, vehicles)
    }

    /// Travel costs between every pair of points.
    pub const fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    /// Demand per point, indexed like the matrix.
    pub fn demands(&self) -> &[u32] {
        &self.demands
    }

    /// Demand of a single point; out-of-range indices have no demand.
    pub fn demand(&self, point: usize) -> u32 {
        self.demands.get(point).copied().unwrap_or(0)
    }

    /// The fleet, ordered by vehicle id.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Number of vehicles available.
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// Capacity per vehicle, ordered by vehicle id.
    pub fn vehicle_capacities(&self) -> impl Iterator<Item = u32> + '_ {
        self.vehicles.iter().map(|vehicle| vehicle.capacity)
    }

    /// Number of points including the depot.
    pub const fn num_points(&self) -> usize {
        self.matrix.size()
    }

    /// Index of the depot.
    pub const fn depot(&self) -> usize {
        DEPOT
    }

    /// Indices of every non-depot point.
    pub const fn customers(&self) -> Range<usize> {
        (DEPOT + 1)..self.matrix.size()
    }

    /// Sum of all demands.
    pub fn total_demand(&self) -> u64 {
        self.demands.iter().map(|&demand| u64::from(demand)).sum()
    }

    /// Sum of all vehicle capacities.
    pub fn total_capacity(&self) -> u64 {
        self.vehicle_capacities().map(u64::from).sum()
    }

    /// Largest single vehicle capacity.
    pub fn max_capacity(&self) -> u32 {
        self.vehicle_capacities().max().unwrap_or(0)
    }
}
