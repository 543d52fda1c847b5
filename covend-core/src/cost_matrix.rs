//! Pairwise travel costs over a road network.
//!
//! Every point is snapped to its nearest graph node. One single-source
//! shortest-path traversal then runs per *distinct* snapped node, so points
//! sharing a node share a traversal and sit at distance zero from each other.
//! Traversals are independent and run on a bounded rayon pool; each matrix
//! row has exactly one producer and rows are merged in point order.
//!
//! The graph is requested for a radius that reaches every point plus
//! [`COVERAGE_MARGIN_M`], so no point is snapped to a node at the rim of a
//! graph that stops short of it.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use geo::Coord;
use rayon::prelude::*;
use thiserror::Error;

use crate::network::{haversine_m, validate_radius};
use crate::{Cost, DistanceMatrix, NodeId, Point, Quota, RoadGraph, RoadNetworkError, RoadNetworkService};

/// Metres of road network kept beyond the point farthest from the centre.
pub const COVERAGE_MARGIN_M: f64 = 200.0;

/// Tuning for [`CostMatrixBuilder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostMatrixConfig {
    /// Upper bound on worker threads; `None` uses rayon's default.
    pub workers: Option<NonZeroUsize>,
}

impl CostMatrixConfig {
    /// Limit traversals to `workers` threads.
    #[must_use]
    pub const fn with_workers(mut self, workers: NonZeroUsize) -> Self {
        self.workers = Some(workers);
        self
    }
}

/// Errors from [`CostMatrixBuilder::build_cost_matrix`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CostMatrixError {
    /// No points were supplied.
    #[error("at least one point is required")]
    EmptyInput,
    /// The road network could not be built or queried.
    #[error("road network failure")]
    Network(#[source] RoadNetworkError),
    /// Two points are not connected in the road network.
    #[error("no road path from point {from} to point {to}")]
    UnreachablePair {
        /// Index of the source point.
        from: usize,
        /// Index of the destination point.
        to: usize,
    },
    /// The quota ran out before the matrix was complete.
    #[error("cost matrix computation cancelled: quota reached")]
    Cancelled,
    /// The worker pool could not be created.
    #[error("failed to start worker pool: {message}")]
    WorkerPool {
        /// Description from the thread pool builder.
        message: String,
    },
}

impl From<RoadNetworkError> for CostMatrixError {
    fn from(err: RoadNetworkError) -> Self {
        match err {
            RoadNetworkError::Cancelled => Self::Cancelled,
            other => Self::Network(other),
        }
    }
}

/// Summary of one matrix build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostMatrixStats {
    /// Number of points in the matrix.
    pub points: usize,
    /// Number of single-source traversals run.
    pub distinct_sources: usize,
    /// Nodes in the road graph.
    pub graph_nodes: usize,
    /// Directed edges in the road graph.
    pub graph_edges: usize,
}

/// Builds [`DistanceMatrix`] values from a [`RoadNetworkService`].
///
/// # Examples
/// ```
/// use geo::Coord;
/// use covend_core::{
///     CostMatrixBuilder, Point, Quota, RoadGraph, RoadGraphBuilder, RoadNetworkError,
///     RoadNetworkService, Unlimited,
/// };
///
/// struct TwoJunctions;
///
/// impl RoadNetworkService for TwoJunctions {
///     fn build_graph(&self, _: Coord<f64>, _: f64, _: &dyn Quota) -> Result<RoadGraph, RoadNetworkError> {
///         let mut builder = RoadGraphBuilder::new();
///         let a = builder.add_node(1, Coord { x: 0.0, y: 0.0 });
///         let b = builder.add_node(2, Coord { x: 0.001, y: 0.0 });
///         builder.add_two_way(a, b, 111.0);
///         Ok(builder.build())
///     }
/// }
///
/// # fn main() -> Result<(), covend_core::CostMatrixError> {
/// let origin = Coord { x: 0.0, y: 0.0 };
/// let points = vec![Point::depot(origin), Point::new(1, Coord { x: 0.001, y: 0.0 }, 10)];
///
/// let matrix = CostMatrixBuilder::new(&TwoJunctions).build_cost_matrix(&points, origin, 500.0, &Unlimited)?;
/// assert_eq!(matrix.cost(0, 1), 111);
/// assert_eq!(matrix.cost(1, 1), 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CostMatrixBuilder<'a, N: ?Sized> {
    network: &'a N,
    config: CostMatrixConfig,
}

impl<'a, N: RoadNetworkService + ?Sized> CostMatrixBuilder<'a, N> {
    /// Create a builder with default configuration.
    pub fn new(network: &'a N) -> Self {
        Self::with_config(network, CostMatrixConfig::default())
    }

    /// Create a builder with explicit configuration.
    pub const fn with_config(network: &'a N, config: CostMatrixConfig) -> Self {
        Self { network, config }
    }

    /// Build the travel-cost matrix for `points`.
    ///
    /// The graph covers at least `radius_m` metres around `center`, widened
    /// by [`covering_radius`] when a point lies farther out.
    ///
    /// # Errors
    ///
    /// Fails with [`CostMatrixError::EmptyInput`] for an empty slice,
    /// [`CostMatrixError::Network`] when the graph cannot be built or is
    /// empty, [`CostMatrixError::UnreachablePair`] for the first disconnected
    /// pair in row-major order and [`CostMatrixError::Cancelled`] once the
    /// quota is reached.
    pub fn build_cost_matrix(
        &self,
        points: &[Point],
        center: Coord<f64>,
        radius_m: f64,
        quota: &dyn Quota,
    ) -> Result<DistanceMatrix, CostMatrixError> {
        self.build_with_stats(points, center, radius_m, quota)
            .map(|(matrix, _)| matrix)
    }

    /// As [`Self::build_cost_matrix`], also returning build statistics.
    pub fn build_with_stats(
        &self,
        points: &[Point],
        center: Coord<f64>,
        radius_m: f64,
        quota: &dyn Quota,
    ) -> Result<(DistanceMatrix, CostMatrixStats), CostMatrixError> {
        if points.is_empty() {
            return Err(CostMatrixError::EmptyInput);
        }
        validate_radius(radius_m)?;
        let radius = covering_radius(points, center, radius_m);
        if radius > radius_m {
            log::info!(
                "widening road network radius from {radius_m:.0}m to {radius:.0}m to cover every point"
            );
        }
        let graph = self.network.build_graph(center, radius, quota)?;
        log::info!(
            "road graph ready: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        matrix_from_graph(&graph, points, self.config, quota)
    }
}

/// Smallest radius around `center` reaching every point with
/// [`COVERAGE_MARGIN_M`] to spare, never less than `radius_m`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use covend_core::cost_matrix::{COVERAGE_MARGIN_M, covering_radius};
/// use covend_core::Point;
///
/// let origin = Coord { x: 0.0, y: 0.0 };
/// let near = [Point::depot(origin), Point::new(1, Coord { x: 0.001, y: 0.0 }, 10)];
/// assert_eq!(covering_radius(&near, origin, 500.0), 500.0);
///
/// let far = [Point::depot(origin), Point::new(1, Coord { x: 0.0, y: 0.01 }, 10)];
/// assert!(covering_radius(&far, origin, 500.0) > 1_100.0 + COVERAGE_MARGIN_M);
/// ```
#[must_use]
pub fn covering_radius(points: &[Point], center: Coord<f64>, radius_m: f64) -> f64 {
    points
        .iter()
        .map(|point| haversine_m(center, point.location) + COVERAGE_MARGIN_M)
        .filter(|needed| needed.is_finite())
        .fold(radius_m, f64::max)
}

/// Compute the cost matrix for `points` over an existing graph.
///
/// # Errors
///
/// See [`CostMatrixBuilder::build_cost_matrix`].
pub fn matrix_from_graph(
    graph: &RoadGraph,
    points: &[Point],
    config: CostMatrixConfig,
    quota: &dyn Quota,
) -> Result<(DistanceMatrix, CostMatrixStats), CostMatrixError> {
    if points.is_empty() {
        return Err(CostMatrixError::EmptyInput);
    }
    let snapped = points
        .iter()
        .map(|point| graph.nearest_node(point.location))
        .collect::<Result<Vec<NodeId>, _>>()?;

    let mut sources: BTreeMap<NodeId, usize> = BTreeMap::new();
    for node in &snapped {
        let next = sources.len();
        sources.entry(*node).or_insert(next);
    }
    let ordered: Vec<NodeId> = {
        let mut by_slot: Vec<(usize, NodeId)> =
            sources.iter().map(|(node, slot)| (*slot, *node)).collect();
        by_slot.sort_unstable();
        by_slot.into_iter().map(|(_, node)| node).collect()
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers.map_or(0, NonZeroUsize::get))
        .build()
        .map_err(|err| CostMatrixError::WorkerPool {
            message: err.to_string(),
        })?;
    log::debug!(
        "running {} traversals on {} workers",
        ordered.len(),
        pool.current_num_threads()
    );

    let rows: Vec<Result<Vec<Option<f64>>, RoadNetworkError>> = pool.install(|| {
        ordered
            .par_iter()
            .map(|&source| {
                graph.shortest_path_lengths_from(source, quota).map(|lengths| {
                    snapped
                        .iter()
                        .map(|target| lengths.get(target.0).copied().flatten())
                        .collect()
                })
            })
            .collect()
    });
    let rows = rows.into_iter().collect::<Result<Vec<_>, _>>()?;

    let mut matrix = DistanceMatrix::zeros(points.len());
    for (from, from_node) in snapped.iter().enumerate() {
        let row = sources
            .get(from_node)
            .and_then(|slot| rows.get(*slot))
            .ok_or(CostMatrixError::UnreachablePair { from, to: from })?;
        for (to, to_node) in snapped.iter().enumerate() {
            if from == to || from_node == to_node {
                continue;
            }
            let length = row
                .get(to)
                .copied()
                .flatten()
                .ok_or(CostMatrixError::UnreachablePair { from, to })?;
            matrix.set(from, to, metres(length));
        }
    }

    let stats = CostMatrixStats {
        points: points.len(),
        distinct_sources: ordered.len(),
        graph_nodes: graph.node_count(),
        graph_edges: graph.edge_count(),
    };
    log::info!(
        "cost matrix built for {} points from {} traversals",
        stats.points,
        stats.distinct_sources
    );
    Ok((matrix, stats))
}

/// Round a path length to whole metres.
fn metres(length: f64) -> Cost {
    if length.is_finite() && length > 0.0 {
        length.round() as Cost
    } else {
        0
    }
}
