//! Routable road graph with nearest-node lookup and shortest-path queries.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use geo::{Coord, Distance, Haversine, Point};
use ordered_float::OrderedFloat;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::RoadNetworkError;
use crate::Quota;

/// How many heap pops pass between quota checks during Dijkstra.
const QUOTA_POLL_INTERVAL: usize = 1024;

/// Index of a node within a [`RoadGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A road junction or shape point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadNode {
    /// OpenStreetMap node identifier, or a synthetic id for generated graphs.
    pub osm_id: i64,
    /// WGS84 position with `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
}

type IndexedNode = GeomWithData<[f64; 2], usize>;

/// Great-circle distance between two coordinates in metres.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use covend_core::network::haversine_m;
///
/// let a = Coord { x: 0.0, y: 0.0 };
/// let b = Coord { x: 0.0, y: 1.0 };
/// let metres = haversine_m(a, b);
/// assert!((metres - 111_195.0).abs() < 100.0);
/// ```
pub fn haversine_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b))
}

/// Incrementally assembles a [`RoadGraph`].
///
/// Nodes are deduplicated by `osm_id`, so ways sharing a junction connect.
#[derive(Debug, Default)]
pub struct RoadGraphBuilder {
    graph: DiGraph<RoadNode, f64>,
    by_osm_id: HashMap<i64, NodeIndex>,
}

impl RoadGraphBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, returning the existing id when `osm_id` was seen before.
    pub fn add_node(&mut self, osm_id: i64, location: Coord<f64>) -> NodeId {
        let graph = &mut self.graph;
        let index = *self
            .by_osm_id
            .entry(osm_id)
            .or_insert_with(|| graph.add_node(RoadNode { osm_id, location }));
        NodeId(index.index())
    }

    /// Add a directed edge of `length_m` metres.
    ///
    /// Edges touching unknown nodes, and self-loops, are ignored.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, length_m: f64) {
        let count = self.graph.node_count();
        if from == to || from.0 >= count || to.0 >= count {
            return;
        }
        self.graph
            .add_edge(NodeIndex::new(from.0), NodeIndex::new(to.0), length_m);
    }

    /// Add edges in both directions.
    pub fn add_two_way(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.add_edge(a, b, length_m);
        self.add_edge(b, a, length_m);
    }

    /// Haversine length between two inserted nodes.
    pub fn segment_length(&self, a: NodeId, b: NodeId) -> Option<f64> {
        let a = self.graph.node_weight(NodeIndex::new(a.0))?;
        let b = self.graph.node_weight(NodeIndex::new(b.0))?;
        Some(haversine_m(a.location, b.location))
    }

    /// Number of nodes inserted so far.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges inserted so far.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Finalise the graph and build its spatial index.
    pub fn build(self) -> RoadGraph {
        RoadGraph::from_digraph(self.graph)
    }
}

/// A directed road graph whose edge weights are lengths in metres.
///
/// Nearest-node lookups use an R\*-tree over an equirectangular projection
/// scaled at the graph's mean latitude, which is accurate at the city scale
/// these graphs cover.
#[derive(Debug, Clone)]
pub struct RoadGraph {
    graph: DiGraph<RoadNode, f64>,
    index: RTree<IndexedNode>,
    lon_scale: f64,
}

impl RoadGraph {
    fn from_digraph(graph: DiGraph<RoadNode, f64>) -> Self {
        let count = graph.node_count();
        let lon_scale = if count == 0 {
            1.0
        } else {
            let mean_lat = graph
                .node_weights()
                .map(|node| node.location.y)
                .sum::<f64>()
                / count as f64;
            mean_lat.to_radians().cos()
        };
        let entries = graph
            .node_indices()
            .map(|idx| {
                let location = graph[idx].location;
                GeomWithData::new(project(location, lon_scale), idx.index())
            })
            .collect();
        Self {
            graph,
            index: RTree::bulk_load(entries),
            lon_scale,
        }
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node payload for `id`.
    pub fn node(&self, id: NodeId) -> Option<&RoadNode> {
        self.graph.node_weight(NodeIndex::new(id.0))
    }

    /// Whether every edge has a reverse edge of the same length.
    pub fn is_undirected(&self) -> bool {
        self.graph.edge_references().all(|edge| {
            self.graph
                .edges_connecting(edge.target(), edge.source())
                .any(|back| back.weight() == edge.weight())
        })
    }

    /// Graph node closest to `location`; ties go to the smaller id.
    ///
    /// # Errors
    ///
    /// Returns [`RoadNetworkError::NoNodeFound`] when the graph is empty.
    pub fn nearest_node(&self, location: Coord<f64>) -> Result<NodeId, RoadNetworkError> {
        let query = project(location, self.lon_scale);
        let mut candidates = self.index.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best) = candidates.next().ok_or(RoadNetworkError::NoNodeFound)?;
        let winner = candidates
            .take_while(|(_, dist)| *dist == best)
            .map(|(node, _)| node.data)
            .fold(first.data, usize::min);
        Ok(NodeId(winner))
    }

    /// Shortest path length in metres from `source` to every node.
    ///
    /// Entry `i` is `None` when node `i` cannot be reached.
    ///
    /// # Errors
    ///
    /// Returns [`RoadNetworkError::UnknownNode`] for a foreign `source` and
    /// [`RoadNetworkError::Cancelled`] when `quota` is reached.
    pub fn shortest_path_lengths_from(
        &self,
        source: NodeId,
        quota: &dyn Quota,
    ) -> Result<Vec<Option<f64>>, RoadNetworkError> {
        self.dijkstra(source, None, quota)
    }

    /// Shortest path length in metres from `from` to `to`.
    ///
    /// Stops as soon as `to` is settled.
    ///
    /// # Errors
    ///
    /// Returns [`RoadNetworkError::Unreachable`] when no path exists,
    /// [`RoadNetworkError::UnknownNode`] for foreign ids and
    /// [`RoadNetworkError::Cancelled`] when `quota` is reached.
    pub fn shortest_path_length(
        &self,
        from: NodeId,
        to: NodeId,
        quota: &dyn Quota,
    ) -> Result<f64, RoadNetworkError> {
        self.check_node(to)?;
        let lengths = self.dijkstra(from, Some(to), quota)?;
        lengths
            .get(to.0)
            .copied()
            .flatten()
            .ok_or(RoadNetworkError::Unreachable { from, to })
    }

    fn check_node(&self, node: NodeId) -> Result<(), RoadNetworkError> {
        if node.0 < self.graph.node_count() {
            Ok(())
        } else {
            Err(RoadNetworkError::UnknownNode { node })
        }
    }

    fn dijkstra(
        &self,
        source: NodeId,
        target: Option<NodeId>,
        quota: &dyn Quota,
    ) -> Result<Vec<Option<f64>>, RoadNetworkError> {
        self.check_node(source)?;
        let mut best: Vec<Option<f64>> = vec![None; self.graph.node_count()];
        let mut settled = vec![false; self.graph.node_count()];
        let mut heap = BinaryHeap::new();
        if let Some(slot) = best.get_mut(source.0) {
            *slot = Some(0.0);
        }
        heap.push(Reverse((OrderedFloat(0.0), source.0)));

        let mut pops = 0_usize;
        while let Some(Reverse((OrderedFloat(dist), node))) = heap.pop() {
            pops += 1;
            if pops % QUOTA_POLL_INTERVAL == 0 && quota.is_reached() {
                log::debug!("shortest path search from node {source} cancelled");
                return Err(RoadNetworkError::Cancelled);
            }
            match settled.get_mut(node) {
                Some(done) if !*done => *done = true,
                _ => continue,
            }
            if target.is_some_and(|t| t.0 == node) {
                break;
            }
            for edge in self
                .graph
                .edges_directed(NodeIndex::new(node), Direction::Outgoing)
            {
                let next = edge.target().index();
                let candidate = dist + *edge.weight();
                if let Some(slot) = best.get_mut(next)
                    && slot.is_none_or(|known| candidate < known)
                {
                    *slot = Some(candidate);
                    heap.push(Reverse((OrderedFloat(candidate), next)));
                }
            }
        }
        Ok(best)
    }
}

fn project(location: Coord<f64>, lon_scale: f64) -> [f64; 2] {
    [location.x * lon_scale, location.y]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Unlimited;
    use crate::quota::CancelFlag;
    use rstest::{fixture, rstest};

    fn coord(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    /// Four nodes on a line: a -> b <-> c, d isolated.
    #[fixture]
    fn line() -> RoadGraph {
        let mut builder = RoadGraphBuilder::new();
        let a = builder.add_node(10, coord(0.0, 0.0));
        let b = builder.add_node(20, coord(0.001, 0.0));
        let c = builder.add_node(30, coord(0.002, 0.0));
        builder.add_node(40, coord(0.01, 0.01));
        builder.add_edge(a, b, 100.0);
        builder.add_two_way(b, c, 50.0);
        builder.build()
    }

    #[rstest]
    fn deduplicates_nodes_by_osm_id() {
        let mut builder = RoadGraphBuilder::new();
        let first = builder.add_node(7, coord(1.0, 1.0));
        let again = builder.add_node(7, coord(2.0, 2.0));
        assert_eq!(first, again);
        assert_eq!(builder.node_count(), 1);
    }

    #[rstest]
    fn ignores_self_loops_and_foreign_nodes() {
        let mut builder = RoadGraphBuilder::new();
        let a = builder.add_node(1, coord(0.0, 0.0));
        builder.add_edge(a, a, 1.0);
        builder.add_edge(a, NodeId(9), 1.0);
        assert_eq!(builder.edge_count(), 0);
    }

    #[rstest]
    fn nearest_node_picks_closest(line: RoadGraph) {
        let node = line.nearest_node(coord(0.0019, 0.0)).expect("node");
        assert_eq!(node, NodeId(2));
    }

    #[rstest]
    fn nearest_node_breaks_ties_by_id() {
        let mut builder = RoadGraphBuilder::new();
        builder.add_node(1, coord(1.0, 0.0));
        builder.add_node(2, coord(-1.0, 0.0));
        let graph = builder.build();
        assert_eq!(graph.nearest_node(coord(0.0, 0.0)), Ok(NodeId(0)));
    }

    #[rstest]
    fn nearest_node_on_empty_graph_fails() {
        let graph = RoadGraphBuilder::new().build();
        assert_eq!(
            graph.nearest_node(coord(0.0, 0.0)),
            Err(RoadNetworkError::NoNodeFound)
        );
    }

    #[rstest]
    fn single_source_lengths_follow_edges(line: RoadGraph) {
        let lengths = line
            .shortest_path_lengths_from(NodeId(0), &Unlimited)
            .expect("lengths");
        assert_eq!(lengths, vec![Some(0.0), Some(100.0), Some(150.0), None]);
    }

    #[rstest]
    fn pairwise_respects_direction(line: RoadGraph) {
        assert_eq!(
            line.shortest_path_length(NodeId(0), NodeId(2), &Unlimited),
            Ok(150.0)
        );
        assert_eq!(
            line.shortest_path_length(NodeId(2), NodeId(0), &Unlimited),
            Err(RoadNetworkError::Unreachable {
                from: NodeId(2),
                to: NodeId(0)
            })
        );
    }

    #[rstest]
    fn rejects_unknown_nodes(line: RoadGraph) {
        assert_eq!(
            line.shortest_path_length(NodeId(0), NodeId(99), &Unlimited),
            Err(RoadNetworkError::UnknownNode { node: NodeId(99) })
        );
    }

    #[rstest]
    fn directedness_is_detected(line: RoadGraph) {
        assert!(!line.is_undirected());
    }

    #[rstest]
    fn large_search_honours_cancellation() {
        let mut builder = RoadGraphBuilder::new();
        let ids: Vec<NodeId> = (0..3000)
            .map(|i| builder.add_node(i, coord(f64::from(i as i32) * 1e-4, 0.0)))
            .collect();
        for pair in ids.windows(2) {
            if let [a, b] = pair {
                builder.add_two_way(*a, *b, 1.0);
            }
        }
        let graph = builder.build();
        let flag = CancelFlag::new();
        flag.cancel();
        assert_eq!(
            graph.shortest_path_lengths_from(NodeId(0), &flag),
            Err(RoadNetworkError::Cancelled)
        );
    }
}
