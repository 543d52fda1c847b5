//! Error types emitted by the covend CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use covend_data::OverpassBuildError;
use covend_solver::PlanError;
use thiserror::Error;

/// Errors emitted by the covend CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name without dashes.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// An option held a value outside its accepted range.
    #[error("invalid --{field}: {reason}")]
    InvalidArgument {
        /// Flag name without dashes.
        field: &'static str,
        /// What was wrong with the value.
        reason: String,
    },
    /// Both road network sources were configured.
    #[error("--overpass-url and --osm-pbf are mutually exclusive")]
    ConflictingSources,
    /// The OSM extract does not exist or is not a file.
    #[error("osm-pbf path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Configured extract path.
        path: Utf8PathBuf,
    },
    /// The OSM extract could not be inspected.
    #[error("failed to inspect osm-pbf path {path:?}: {source}")]
    InspectSourcePath {
        /// Configured extract path.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Constructing the Overpass client failed.
    #[error("failed to build Overpass client for {base_url:?}: {source}")]
    BuildNetwork {
        /// Configured Overpass endpoint.
        base_url: String,
        /// Underlying construction failure.
        #[source]
        source: OverpassBuildError,
    },
    /// Planning failed for a reason other than infeasibility.
    #[error("planning failed: {source}")]
    Plan {
        /// Underlying planner failure.
        #[source]
        source: PlanError,
    },
    /// Serialising the report failed.
    #[error("failed to serialise report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Writing the report failed.
    #[error("failed to write report: {0}")]
    WriteOutput(#[source] std::io::Error),
}
