//! Road networks fetched from an Overpass API instance.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use covend_core::{RoadNetworkService, Unlimited};
//! use covend_data::overpass::{OverpassConfig, OverpassRoadNetwork};
//! use geo::Coord;
//!
//! let config = OverpassConfig::new("https://overpass-api.de/api")
//!     .with_timeout(Duration::from_secs(90));
//! let service = OverpassRoadNetwork::with_config(config)?;
//!
//! let center = Coord { x: -77.0141, y: -12.0432 };
//! let graph = service.build_graph(center, 500.0, &Unlimited)?;
//! println!("{} junctions", graph.node_count());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod response;

pub use client::{
    DEFAULT_OVERPASS_URL, DEFAULT_USER_AGENT, OverpassBuildError, OverpassConfig,
    OverpassRoadNetwork,
};
