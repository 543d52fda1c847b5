//! Overpass API JSON response types.
//!
//! Only the element kinds requested by the drive-graph query are decoded:
//! nodes with coordinates and ways with node references and tags.
//!
//! See: <https://wiki.openstreetmap.org/wiki/Overpass_API/Overpass_QL#JSON>

use std::collections::HashMap;

use serde::Deserialize;

use crate::osm::{OsmExtract, OsmWay, routable_direction};

/// Overpass interpreter response.
///
/// Runtime errors such as timeouts are reported with HTTP 200, an empty
/// element list and a `remark`.
#[derive(Debug, Deserialize)]
pub struct InterpreterResponse {
    /// Decoded elements.
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Server remark, present when the query failed at runtime.
    pub remark: Option<String>,
}

/// One OSM element of the response.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    /// A node with its WGS84 position.
    Node {
        /// OSM node id.
        id: i64,
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lon: f64,
    },
    /// A way with its node references.
    Way {
        /// OSM way id.
        id: i64,
        /// Node references in drawing order.
        #[serde(default)]
        nodes: Vec<i64>,
        /// Key/value tags.
        #[serde(default)]
        tags: HashMap<String, String>,
    },
    /// Relations and other kinds, which carry no routing data here.
    #[serde(other)]
    Other,
}

impl InterpreterResponse {
    /// Whether the server reported a runtime failure instead of data.
    #[must_use]
    pub fn runtime_error(&self) -> Option<&str> {
        self.remark
            .as_deref()
            .filter(|remark| self.elements.is_empty() || remark.contains("error"))
    }

    /// Keep node positions and routable ways.
    #[must_use]
    pub fn into_extract(self) -> OsmExtract {
        let mut extract = OsmExtract::new();
        for element in self.elements {
            match element {
                Element::Node { id, lat, lon } => extract.add_node(id, lon, lat),
                Element::Way { id, nodes, tags } => {
                    let pairs = tags.iter().map(|(key, value)| (key.as_str(), value.as_str()));
                    if let Some(oneway) = routable_direction(pairs) {
                        extract.add_way(OsmWay { id, nodes, oneway });
                    }
                }
                Element::Other => {}
            }
        }
        extract
    }
}
