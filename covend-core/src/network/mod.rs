//! Road networks: graph construction, nearest-node lookup and shortest paths.
//!
//! A [`RoadNetworkService`] materialises a [`RoadGraph`] around a centre
//! coordinate. The graph answers the two queries the cost matrix needs:
//! the node nearest to a coordinate, and shortest path lengths from a node.
//! Edge weights are road segment lengths in metres.

mod error;
mod graph;
mod service;

pub use error::RoadNetworkError;
pub use graph::{NodeId, RoadGraph, RoadGraphBuilder, RoadNode, haversine_m};
pub use service::{RoadNetworkService, validate_radius};
