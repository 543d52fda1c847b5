use thiserror::Error;

use super::NodeId;

/// Errors from [`crate::RoadNetworkService::build_graph`] and the
/// [`crate::RoadGraph`] queries.
///
/// Messages from transports and decoders are captured as text so the error
/// stays `Clone` and comparable in tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoadNetworkError {
    /// Map data could not be retrieved or decoded.
    #[error("road network unavailable: {message}")]
    NetworkUnavailable {
        /// Description of the underlying failure.
        message: String,
    },
    /// The requested area holds no routable roads.
    #[error("no routable roads within {radius_m}m of ({lat}, {lon})")]
    EmptyRegion {
        /// Latitude of the requested centre.
        lat: f64,
        /// Longitude of the requested centre.
        lon: f64,
        /// Requested radius in metres.
        radius_m: f64,
    },
    /// A nearest-node query ran against an empty graph.
    #[error("graph has no nodes to match against")]
    NoNodeFound,
    /// No path connects the two nodes.
    #[error("no path from node {from} to node {to}")]
    Unreachable {
        /// Source node.
        from: NodeId,
        /// Target node.
        to: NodeId,
    },
    /// A node id did not belong to the graph.
    #[error("node {node} is not part of the graph")]
    UnknownNode {
        /// Offending node id.
        node: NodeId,
    },
    /// The radius was not a positive finite number of metres.
    #[error("radius must be positive and finite, got {radius_m}")]
    InvalidRadius {
        /// Radius supplied by the caller.
        radius_m: f64,
    },
    /// The computational quota ran out before the operation finished.
    #[error("road network operation cancelled: quota reached")]
    Cancelled,
}

