//! Test doubles for road networks, quotas and instances used by unit and
//! behaviour tests across the workspace.

use geo::Coord;

use crate::{
    Cost, DistanceMatrix, InstanceError, ProblemInstance, Quota, RoadGraph, RoadGraphBuilder,
    RoadNetworkError, RoadNetworkService, network::validate_radius,
};

/// Metres per degree of latitude on the mean Earth sphere.
const METRES_PER_DEGREE: f64 = 111_195.0;

/// Synthetic square lattice of two-way streets.
///
/// Node `(row, col)` has id `row * side + col` and sits `spacing_m` metres
/// from its neighbours; every edge weighs exactly `spacing_m`, so shortest
/// paths follow Manhattan distance on the lattice. The lattice ignores the
/// requested centre and is anchored at its own origin.
#[derive(Debug, Clone, Copy)]
pub struct GridRoadNetwork {
    side: usize,
    spacing_m: f64,
    origin: Coord<f64>,
}

impl GridRoadNetwork {
    /// Lattice of `side × side` junctions anchored at `(0, 0)`.
    pub const fn new(side: usize, spacing_m: f64) -> Self {
        Self {
            side,
            spacing_m,
            origin: Coord { x: 0.0, y: 0.0 },
        }
    }

    /// Move the lattice's `(0, 0)` junction to `origin`.
    #[must_use]
    pub const fn with_origin(mut self, origin: Coord<f64>) -> Self {
        self.origin = origin;
        self
    }

    /// Coordinate of junction `(row, col)`.
    pub fn coord_of(&self, row: usize, col: usize) -> Coord<f64> {
        let lon_metres = METRES_PER_DEGREE * self.origin.y.to_radians().cos();
        Coord {
            x: self.origin.x + col as f64 * self.spacing_m / lon_metres,
            y: self.origin.y + row as f64 * self.spacing_m / METRES_PER_DEGREE,
        }
    }
}

impl RoadNetworkService for GridRoadNetwork {
    fn build_graph(
        &self,
        center: Coord<f64>,
        radius_m: f64,
        quota: &dyn Quota,
    ) -> Result<RoadGraph, RoadNetworkError> {
        validate_radius(radius_m)?;
        if quota.is_reached() {
            return Err(RoadNetworkError::Cancelled);
        }
        if self.side == 0 {
            return Err(RoadNetworkError::EmptyRegion {
                lat: center.y,
                lon: center.x,
                radius_m,
            });
        }
        let mut builder = RoadGraphBuilder::new();
        let mut osm_id = 0_i64;
        for row in 0..self.side {
            for col in 0..self.side {
                builder.add_node(osm_id, self.coord_of(row, col));
                osm_id += 1;
            }
        }
        let id = |row: usize, col: usize| crate::NodeId(row * self.side + col);
        for row in 0..self.side {
            for col in 0..self.side {
                if col + 1 < self.side {
                    builder.add_two_way(id(row, col), id(row, col + 1), self.spacing_m);
                }
                if row + 1 < self.side {
                    builder.add_two_way(id(row, col), id(row + 1, col), self.spacing_m);
                }
            }
        }
        Ok(builder.build())
    }
}

/// Road network returning a fixed graph or a fixed error.
#[derive(Debug, Clone)]
pub struct StubRoadNetwork {
    outcome: Result<RoadGraph, RoadNetworkError>,
}

impl StubRoadNetwork {
    /// Always return `graph`.
    pub const fn with_graph(graph: RoadGraph) -> Self {
        Self { outcome: Ok(graph) }
    }

    /// Always fail with `error`.
    pub const fn with_error(error: RoadNetworkError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl RoadNetworkService for StubRoadNetwork {
    fn build_graph(
        &self,
        _center: Coord<f64>,
        _radius_m: f64,
        _quota: &dyn Quota,
    ) -> Result<RoadGraph, RoadNetworkError> {
        self.outcome.clone()
    }
}

/// Quota that is exhausted from the start.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExhaustedQuota;

impl Quota for ExhaustedQuota {
    fn is_reached(&self) -> bool {
        true
    }
}

/// Matrix of rounded Euclidean distances between integer coordinates.
pub fn euclidean_matrix(coords: &[(i32, i32)]) -> DistanceMatrix {
    let mut matrix = DistanceMatrix::zeros(coords.len());
    for (i, &(ax, ay)) in coords.iter().enumerate() {
        for (j, &(bx, by)) in coords.iter().enumerate() {
            let dx = f64::from(ax - bx);
            let dy = f64::from(ay - by);
            matrix.set(i, j, dx.hypot(dy).round() as Cost);
        }
    }
    matrix
}

/// Instance over integer coordinates with a uniform fleet.
///
/// The first coordinate is the depot; `demands[0]` must be zero.
pub fn euclidean_instance(
    coords: &[(i32, i32)],
    demands: Vec<u32>,
    num_vehicles: usize,
    capacity: u32,
) -> Result<ProblemInstance, InstanceError> {
    ProblemInstance::with_uniform_fleet(euclidean_matrix(coords), demands, num_vehicles, capacity)
}
