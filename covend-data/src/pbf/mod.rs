//! Road networks read from a local `.osm.pbf` extract.
//!
//! Decoding runs in two parallel passes over the file: the first collects
//! routable ways, the second resolves the positions of the nodes they
//! reference.
//!
//! # Examples
//! ```no_run
//! use covend_core::{RoadNetworkService, Unlimited};
//! use covend_data::pbf::OsmPbfRoadNetwork;
//! use geo::Coord;
//!
//! let service = OsmPbfRoadNetwork::new("lima.osm.pbf");
//! let center = Coord { x: -77.0141, y: -12.0432 };
//! let graph = service.build_graph(center, 500.0, &Unlimited)?;
//! println!("{} junctions", graph.node_count());
//! # Ok::<(), covend_core::RoadNetworkError>(())
//! ```

use std::io::BufReader;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::File;
use covend_core::{Quota, RoadGraph, RoadNetworkError, RoadNetworkService};
use covend_fs::open_utf8_file;
use geo::Coord;
use log::{debug, info};
use osmpbf::ElementReader;

use crate::osm::{OsmExtract, SearchArea};

mod accumulator;

use accumulator::{WayPass, resolve_node};

/// Drive graph read from an OpenStreetMap PBF extract on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsmPbfRoadNetwork {
    path: Utf8PathBuf,
}

impl OsmPbfRoadNetwork {
    /// Read road data from the extract at `path`.
    ///
    /// The file is opened lazily on each [`RoadNetworkService::build_graph`]
    /// call.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the extract.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn reader(&self) -> Result<ElementReader<BufReader<File>>, RoadNetworkError> {
        let file = open_utf8_file(&self.path).map_err(|err| RoadNetworkError::NetworkUnavailable {
            message: format!("failed to open OSM PBF file at {}: {err}", self.path),
        })?;
        Ok(ElementReader::new(BufReader::new(file)))
    }

    fn decode_error(&self, err: &osmpbf::Error) -> RoadNetworkError {
        RoadNetworkError::NetworkUnavailable {
            message: format!("failed to decode OSM PBF data at {}: {err}", self.path),
        }
    }

    /// Decode every routable way and the positions of their nodes.
    fn read_extract(&self, quota: &dyn Quota) -> Result<OsmExtract, RoadNetworkError> {
        let ways = self
            .reader()?
            .par_map_reduce(WayPass::from_element, WayPass::default, WayPass::combine)
            .map_err(|err| self.decode_error(&err))?;
        debug!(
            "scanned {} elements of {}, {} routable ways",
            ways.elements,
            self.path,
            ways.ways.len()
        );
        if quota.is_reached() {
            return Err(RoadNetworkError::Cancelled);
        }

        let referenced = &ways.referenced;
        let mut extract = self
            .reader()?
            .par_map_reduce(
                |element| resolve_node(element, referenced),
                OsmExtract::new,
                OsmExtract::merge,
            )
            .map_err(|err| self.decode_error(&err))?;
        for way in ways.ways {
            extract.add_way(way);
        }
        Ok(extract)
    }
}

impl RoadNetworkService for OsmPbfRoadNetwork {
    fn build_graph(
        &self,
        center: Coord<f64>,
        radius_m: f64,
        quota: &dyn Quota,
    ) -> Result<RoadGraph, RoadNetworkError> {
        let area = SearchArea::new(center, radius_m)?;
        if quota.is_reached() {
            return Err(RoadNetworkError::Cancelled);
        }
        info!(
            "reading road network within {radius_m}m of ({}, {}) from {}",
            center.y, center.x, self.path
        );
        let extract = self.read_extract(quota)?;
        if quota.is_reached() {
            return Err(RoadNetworkError::Cancelled);
        }
        extract.into_graph(&area, quota)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covend_core::Unlimited;
    use covend_core::test_support::ExhaustedQuota;
    use rstest::rstest;
    use std::io::Write;

    const ORIGIN: Coord<f64> = Coord { x: 0.0, y: 0.0 };

    #[rstest]
    fn missing_file_is_unavailable() {
        let service = OsmPbfRoadNetwork::new("/nonexistent/covend/missing.osm.pbf");

        let err = service
            .build_graph(ORIGIN, 500.0, &Unlimited)
            .expect_err("missing file");

        match err {
            RoadNetworkError::NetworkUnavailable { message } => {
                assert!(message.contains("missing.osm.pbf"), "{message}");
            }
            other => panic!("expected unavailable network, got {other:?}"),
        }
    }

    #[rstest]
    fn corrupt_file_is_unavailable() {
        let mut file = tempfile::Builder::new()
            .suffix(".osm.pbf")
            .tempfile()
            .expect("temp file");
        file.write_all(b"\x00\x00\x00\x0dnot a pbf blob at all")
            .expect("write");
        file.flush().expect("flush");
        let path = Utf8PathBuf::from_path_buf(file.path().to_path_buf()).expect("utf-8 path");
        let service = OsmPbfRoadNetwork::new(path);

        let err = service
            .build_graph(ORIGIN, 500.0, &Unlimited)
            .expect_err("corrupt file");

        assert!(matches!(err, RoadNetworkError::NetworkUnavailable { .. }));
    }

    #[rstest]
    fn quota_is_checked_before_reading() {
        let service = OsmPbfRoadNetwork::new("/nonexistent/covend/missing.osm.pbf");

        let err = service
            .build_graph(ORIGIN, 500.0, &ExhaustedQuota)
            .expect_err("cancelled");

        assert_eq!(err, RoadNetworkError::Cancelled);
    }

    #[rstest]
    fn radius_is_validated_first() {
        let service = OsmPbfRoadNetwork::new("/nonexistent/covend/missing.osm.pbf");

        let err = service
            .build_graph(ORIGIN, f64::NAN, &Unlimited)
            .expect_err("invalid radius");

        assert!(matches!(err, RoadNetworkError::InvalidRadius { .. }));
    }
}
