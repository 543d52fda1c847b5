//! OSM elements reduced to what graph assembly needs.
//!
//! Both road network services decode their source into an [`OsmExtract`]
//! of node positions and routable ways, then call
//! [`OsmExtract::into_graph`] to build the [`RoadGraph`] for a
//! [`SearchArea`].

use std::collections::HashMap;

use covend_core::network::haversine_m;
use covend_core::network::validate_radius;
use covend_core::{Quota, RoadGraph, RoadGraphBuilder, RoadNetworkError};
use geo::Coord;
use log::{debug, warn};

mod tags;

pub use tags::{Oneway, is_routable_highway};
pub(crate) use tags::routable_direction;

/// Ways processed between quota checks during assembly.
const QUOTA_POLL_WAYS: usize = 256;

/// The disc a road network service is asked to cover.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchArea {
    center: Coord<f64>,
    radius_m: f64,
}

impl SearchArea {
    /// Describe the disc of `radius_m` metres around `center`.
    ///
    /// # Errors
    ///
    /// Returns [`RoadNetworkError::InvalidRadius`] for unusable radii.
    pub fn new(center: Coord<f64>, radius_m: f64) -> Result<Self, RoadNetworkError> {
        validate_radius(radius_m)?;
        Ok(Self { center, radius_m })
    }

    /// Centre of the disc, `x = longitude`, `y = latitude`.
    #[must_use]
    pub const fn center(&self) -> Coord<f64> {
        self.center
    }

    /// Radius of the disc in metres.
    #[must_use]
    pub const fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Whether `location` lies inside the disc.
    #[must_use]
    pub fn contains(&self, location: Coord<f64>) -> bool {
        haversine_m(self.center, location) <= self.radius_m
    }

    /// The error reported when nothing routable lies inside the disc.
    #[must_use]
    pub const fn empty_region(&self) -> RoadNetworkError {
        RoadNetworkError::EmptyRegion {
            lat: self.center.y,
            lon: self.center.x,
            radius_m: self.radius_m,
        }
    }
}

/// A routable way: its node references and permitted direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsmWay {
    /// OSM way id.
    pub id: i64,
    /// Node references in drawing order.
    pub nodes: Vec<i64>,
    /// Permitted travel direction.
    pub oneway: Oneway,
}

/// Node positions and routable ways decoded from OSM data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsmExtract {
    nodes: HashMap<i64, Coord<f64>>,
    ways: Vec<OsmWay>,
}

impl OsmExtract {
    /// Create an empty extract.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node position; invalid WGS84 coordinates are dropped.
    pub fn add_node(&mut self, id: i64, lon: f64, lat: f64) {
        if let Some(location) = validated_coord(lon, lat) {
            self.nodes.insert(id, location);
        }
    }

    /// Record a routable way.
    pub fn add_way(&mut self, way: OsmWay) {
        self.ways.push(way);
    }

    /// Number of node positions recorded.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of routable ways recorded.
    #[must_use]
    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    /// Fold another extract into this one.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (id, location) in other.nodes {
            self.nodes.entry(id).or_insert(location);
        }
        self.ways.extend(other.ways);
        self
    }

    /// Assemble the road graph inside `area`.
    ///
    /// Consecutive way nodes become edges weighted by their haversine
    /// length. A segment is kept only when both ends lie inside `area`.
    /// Segments with an unresolved node reference are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RoadNetworkError::EmptyRegion`] when no segment survives
    /// and [`RoadNetworkError::Cancelled`] once `quota` is reached.
    pub fn into_graph(
        self,
        area: &SearchArea,
        quota: &dyn Quota,
    ) -> Result<RoadGraph, RoadNetworkError> {
        let Self { nodes, ways } = self;
        let in_range: HashMap<i64, Coord<f64>> = nodes
            .iter()
            .filter(|(_, location)| area.contains(**location))
            .map(|(id, location)| (*id, *location))
            .collect();

        let mut builder = RoadGraphBuilder::new();
        let mut broken_ways = 0_usize;
        for (index, way) in ways.iter().enumerate() {
            if index % QUOTA_POLL_WAYS == 0 && quota.is_reached() {
                return Err(RoadNetworkError::Cancelled);
            }
            if way.nodes.iter().any(|id| !nodes.contains_key(id)) {
                broken_ways += 1;
            }
            for pair in way.nodes.windows(2) {
                let [a, b] = pair else { continue };
                let (Some(&from), Some(&to)) = (in_range.get(a), in_range.get(b)) else {
                    continue;
                };
                let from_id = builder.add_node(*a, from);
                let to_id = builder.add_node(*b, to);
                let length_m = haversine_m(from, to);
                match way.oneway {
                    Oneway::Both => builder.add_two_way(from_id, to_id, length_m),
                    Oneway::Forward => builder.add_edge(from_id, to_id, length_m),
                    Oneway::Reverse => builder.add_edge(to_id, from_id, length_m),
                }
            }
        }

        if broken_ways > 0 {
            warn!("skipped segments of {broken_ways} ways with unresolved node references");
        }
        if builder.edge_count() == 0 {
            return Err(area.empty_region());
        }
        let graph = builder.build();
        debug!(
            "assembled road graph with {} nodes and {} edges from {} ways",
            graph.node_count(),
            graph.edge_count(),
            ways.len()
        );
        Ok(graph)
    }
}

fn validated_coord(lon: f64, lat: f64) -> Option<Coord<f64>> {
    (lon.is_finite()
        && lat.is_finite()
        && (-180.0..=180.0).contains(&lon)
        && (-90.0..=90.0).contains(&lat))
    .then_some(Coord { x: lon, y: lat })
}
