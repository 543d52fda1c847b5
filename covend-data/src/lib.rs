//! OpenStreetMap road networks for the covend routing engine.
//!
//! Responsibilities:
//! - Implement [`covend_core::RoadNetworkService`] over real map data.
//! - Fetch drive graphs from an Overpass API instance ([`overpass`]).
//! - Read drive graphs from local `.osm.pbf` extracts ([`pbf`]).
//!
//! Boundaries:
//! - Do not encode routing rules (live in `covend-core` and `covend-solver`).
//! - Keep the service trait synchronous; async transports block internally.
//!
//! Invariants:
//! - Both services assemble graphs the same way ([`osm::OsmExtract`]).
//! - No global mutable state.

#![forbid(unsafe_code)]

pub mod osm;
pub mod overpass;
pub mod pbf;

pub use osm::{OsmExtract, OsmWay, Oneway, SearchArea};
pub use overpass::{OverpassBuildError, OverpassConfig, OverpassRoadNetwork};
pub use pbf::OsmPbfRoadNetwork;
