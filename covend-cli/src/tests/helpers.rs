//! Test helpers shared by the solve unit and behaviour tests.

use camino::{Utf8Path, Utf8PathBuf};
use covend_core::RoadNetworkService;
use covend_core::test_support::GridRoadNetwork;
use covend_solver::DEFAULT_ORIGIN;
use geo::Coord;
use tempfile::TempDir;

use crate::CliError;
use crate::solve::{NetworkBuilder, NetworkSource};

/// Write `contents` to `path`, panicking on failure.
pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path, contents).unwrap_or_else(|err| panic!("write {path}: {err}"));
}

/// Temporary directory exposed as a UTF-8 path.
pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Lattice of streets around the default depot, wide enough for the
/// sampler's spread.
pub(super) fn lima_grid() -> GridRoadNetwork {
    GridRoadNetwork::new(24, 100.0).with_origin(Coord {
        x: DEFAULT_ORIGIN.x - 0.011,
        y: DEFAULT_ORIGIN.y - 0.011,
    })
}

/// Serves the synthetic grid whatever source was configured.
#[derive(Debug, Clone, Copy)]
pub(super) struct GridNetworkBuilder;

impl NetworkBuilder for GridNetworkBuilder {
    fn build(&self, _source: &NetworkSource) -> Result<Box<dyn RoadNetworkService>, CliError> {
        Ok(Box::new(lima_grid()))
    }
}
