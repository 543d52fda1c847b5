//! Per-pass accumulators for `.osm.pbf` decoding.
//!
//! The first pass keeps routable ways and the node ids they reference. The
//! second pass resolves those ids to positions, so unrelated nodes of a
//! large extract are never held in memory.
use std::collections::HashSet;

use osmpbf::Element;

use crate::osm::{OsmExtract, OsmWay, routable_direction};

#[derive(Debug, Default)]
pub(super) struct WayPass {
    pub(super) ways: Vec<OsmWay>,
    pub(super) referenced: HashSet<i64>,
    pub(super) elements: u64,
}

impl WayPass {
    pub(super) fn from_element(element: Element<'_>) -> Self {
        let mut pass = Self {
            elements: 1,
            ..Self::default()
        };
        if let Element::Way(way) = element
            && let Some(oneway) = routable_direction(way.tags())
        {
            let nodes: Vec<i64> = way.refs().collect();
            pass.referenced.extend(nodes.iter().copied());
            pass.ways.push(OsmWay {
                id: way.id(),
                nodes,
                oneway,
            });
        }
        pass
    }

    pub(super) fn combine(mut self, other: Self) -> Self {
        self.ways.extend(other.ways);
        self.referenced.extend(other.referenced);
        self.elements += other.elements;
        self
    }
}

pub(super) fn resolve_node(element: Element<'_>, referenced: &HashSet<i64>) -> OsmExtract {
    let mut extract = OsmExtract::new();
    match element {
        Element::Node(node) if referenced.contains(&node.id()) => {
            extract.add_node(node.id(), node.lon(), node.lat());
        }
        Element::DenseNode(node) if referenced.contains(&node.id()) => {
            extract.add_node(node.id(), node.lon(), node.lat());
        }
        _ => {}
    }
    extract
}
