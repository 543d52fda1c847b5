//! Solve command implementation for the covend CLI.

use std::fmt;
use std::io::Write;
use std::num::NonZeroUsize;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use covend_core::{CostMatrixConfig, RoadNetworkService, SolutionReport};
use covend_data::overpass::DEFAULT_OVERPASS_URL;
use covend_data::{OsmPbfRoadNetwork, OverpassRoadNetwork};
use covend_solver::{
    DEFAULT_ORIGIN, DEFAULT_RADIUS_M, DEFAULT_VEHICLE_CAPACITY, FailureKind, PlanError,
    PlannerConfig, RoutePlanner,
};
use geo::Coord;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_OSM_PBF, ARG_OVERPASS_URL, ARG_POINTS, ARG_VEHICLES, ARG_WORKERS, CliError, ENV_POINTS,
    ENV_VEHICLES,
};

/// How the report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// Route blocks followed by fleet totals.
    #[default]
    Text,
    /// The report serialised as JSON.
    Json,
}

/// CLI arguments for the `solve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Sample demand points around a depot, compute shortest \
                 road distances between them over an OpenStreetMap drive \
                 network and route a fleet of equal-capacity vehicles \
                 through them. The network comes from an Overpass API \
                 instance unless a local .osm.pbf extract is given.",
    about = "Solve a capacitated vehicle routing problem"
)]
#[ortho_config(prefix = "COVEND")]
pub(crate) struct SolveArgs {
    /// Number of vehicles in the fleet.
    #[arg(long = ARG_VEHICLES, value_name = "count")]
    #[serde(default)]
    pub(crate) vehicles: Option<usize>,
    /// Number of points to sample, the depot included.
    #[arg(long = ARG_POINTS, value_name = "count")]
    #[serde(default)]
    pub(crate) points: Option<usize>,
    /// Capacity of every vehicle.
    #[arg(long, value_name = "units")]
    #[serde(default)]
    pub(crate) capacity: Option<u32>,
    /// Road network radius around the depot in metres.
    #[arg(long, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius: Option<f64>,
    /// Depot latitude in degrees.
    #[arg(long, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) origin_lat: Option<f64>,
    /// Depot longitude in degrees.
    #[arg(long, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) origin_lon: Option<f64>,
    /// Seed for sampling and search; omit for a fresh run each time.
    #[arg(long, value_name = "seed")]
    #[serde(default)]
    pub(crate) seed: Option<u64>,
    /// Wall-clock budget for the whole run.
    #[arg(long, value_name = "seconds")]
    #[serde(default)]
    pub(crate) time_limit_secs: Option<u64>,
    /// Threads used for shortest-path traversals.
    #[arg(long = ARG_WORKERS, value_name = "count")]
    #[serde(default)]
    pub(crate) workers: Option<usize>,
    /// Base URL of the Overpass API.
    #[arg(long = ARG_OVERPASS_URL, value_name = "url", conflicts_with = "osm_pbf")]
    #[serde(default)]
    pub(crate) overpass_url: Option<String>,
    /// Read the road network from a local `.osm.pbf` extract.
    #[arg(long = ARG_OSM_PBF, value_name = "path")]
    #[serde(default)]
    pub(crate) osm_pbf: Option<Utf8PathBuf>,
    /// Output format.
    #[arg(long, value_enum, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
}

impl SolveArgs {
    pub(crate) fn into_config(self) -> Result<SolveConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SolveConfig::try_from(merged)
    }
}

/// Where the road network comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NetworkSource {
    /// Fetch from an Overpass API instance.
    Overpass { base_url: String },
    /// Read a local extract.
    Pbf { path: Utf8PathBuf },
}

impl fmt::Display for NetworkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overpass { base_url } => write!(f, "Overpass at {base_url}"),
            Self::Pbf { path } => write!(f, "extract {path}"),
        }
    }
}

/// Resolved `solve` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SolveConfig {
    /// Fleet size.
    pub(crate) vehicles: usize,
    /// Points to sample, the depot included.
    pub(crate) points: usize,
    /// Pipeline settings handed to the planner.
    pub(crate) planner: PlannerConfig,
    /// Road network source.
    pub(crate) network: NetworkSource,
    /// Output format.
    pub(crate) format: OutputFormat,
}

impl SolveConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match &self.network {
            NetworkSource::Pbf { path } => Self::require_existing(path),
            NetworkSource::Overpass { .. } => Ok(()),
        }
    }

    fn require_existing(path: &Utf8Path) -> Result<(), CliError> {
        match covend_fs::file_is_file(path) {
            Ok(true) => Ok(()),
            Ok(false) => Err(CliError::MissingSourceFile {
                path: path.to_path_buf(),
            }),
            Err(source) => Err(CliError::InspectSourcePath {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl TryFrom<SolveArgs> for SolveConfig {
    type Error = CliError;

    fn try_from(args: SolveArgs) -> Result<Self, Self::Error> {
        let vehicles = args.vehicles.ok_or(CliError::MissingArgument {
            field: ARG_VEHICLES,
            env: ENV_VEHICLES,
        })?;
        let points = args.points.ok_or(CliError::MissingArgument {
            field: ARG_POINTS,
            env: ENV_POINTS,
        })?;

        let origin = Coord {
            x: args.origin_lon.unwrap_or(DEFAULT_ORIGIN.x),
            y: args.origin_lat.unwrap_or(DEFAULT_ORIGIN.y),
        };
        check_range("origin-lat", origin.y, 90.0)?;
        check_range("origin-lon", origin.x, 180.0)?;

        let mut cost_matrix = CostMatrixConfig::default();
        if let Some(workers) = args.workers {
            let workers = NonZeroUsize::new(workers).ok_or_else(|| CliError::InvalidArgument {
                field: ARG_WORKERS,
                reason: "must be at least 1".to_owned(),
            })?;
            cost_matrix = cost_matrix.with_workers(workers);
        }

        let network = match (args.overpass_url, args.osm_pbf) {
            (Some(_), Some(_)) => return Err(CliError::ConflictingSources),
            (None, Some(path)) => NetworkSource::Pbf { path },
            (base_url, None) => NetworkSource::Overpass {
                base_url: base_url.unwrap_or_else(|| DEFAULT_OVERPASS_URL.to_owned()),
            },
        };

        let planner = PlannerConfig {
            origin,
            radius_m: args.radius.unwrap_or(DEFAULT_RADIUS_M),
            vehicle_capacity: args.capacity.unwrap_or(DEFAULT_VEHICLE_CAPACITY),
            seed: args.seed,
            time_limit: args.time_limit_secs.map(Duration::from_secs),
            cost_matrix,
            ..PlannerConfig::default()
        };

        Ok(Self {
            vehicles,
            points,
            planner,
            network,
            format: args.format.unwrap_or_default(),
        })
    }
}

fn check_range(field: &'static str, value: f64, limit: f64) -> Result<(), CliError> {
    if value.is_finite() && (-limit..=limit).contains(&value) {
        Ok(())
    } else {
        Err(CliError::InvalidArgument {
            field,
            reason: format!("{value} is outside [-{limit}, {limit}]"),
        })
    }
}

/// How a completed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A report was printed.
    Solved,
    /// The problem has no capacity-respecting answer.
    Infeasible,
}

impl SolveOutcome {
    /// Process exit status for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Solved => 0,
            Self::Infeasible => 2,
        }
    }
}

/// Builds the road network service for the current solve invocation.
pub(super) trait NetworkBuilder {
    fn build(&self, source: &NetworkSource) -> Result<Box<dyn RoadNetworkService>, CliError>;
}

pub(super) struct DefaultNetworkBuilder;

impl NetworkBuilder for DefaultNetworkBuilder {
    fn build(&self, source: &NetworkSource) -> Result<Box<dyn RoadNetworkService>, CliError> {
        match source {
            NetworkSource::Overpass { base_url } => {
                let network = OverpassRoadNetwork::new(base_url.clone()).map_err(|source| {
                    CliError::BuildNetwork {
                        base_url: base_url.clone(),
                        source,
                    }
                })?;
                Ok(Box::new(network))
            }
            NetworkSource::Pbf { path } => Ok(Box::new(OsmPbfRoadNetwork::new(path.clone()))),
        }
    }
}

pub(super) fn run_solve(args: SolveArgs) -> Result<SolveOutcome, CliError> {
    let mut stdout = std::io::stdout().lock();
    run_solve_with(args, &DefaultNetworkBuilder, &mut stdout)
}

pub(super) fn run_solve_with(
    args: SolveArgs,
    builder: &dyn NetworkBuilder,
    writer: &mut dyn Write,
) -> Result<SolveOutcome, CliError> {
    let config = resolve_solve_config(args)?;
    let network = builder.build(&config.network)?;
    info!(
        "routing {} vehicles through {} points using {}",
        config.vehicles, config.points, config.network
    );
    let planner = RoutePlanner::new(network, config.planner);
    match planner.plan(config.vehicles, config.points) {
        Ok(report) => {
            write_report(writer, config.format, &report)?;
            Ok(SolveOutcome::Solved)
        }
        Err(err) if err.kind() == FailureKind::NoAnswer => {
            write_infeasible(writer, config.format, &err)?;
            Ok(SolveOutcome::Infeasible)
        }
        Err(source) => Err(CliError::Plan { source }),
    }
}

fn resolve_solve_config(args: SolveArgs) -> Result<SolveConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn write_report(
    writer: &mut dyn Write,
    format: OutputFormat,
    report: &SolutionReport,
) -> Result<(), CliError> {
    let payload = match format {
        OutputFormat::Text => report.to_string(),
        OutputFormat::Json => {
            let mut json =
                serde_json::to_string_pretty(report).map_err(CliError::SerialiseReport)?;
            json.push('\n');
            json
        }
    };
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)
}

/// JSON body printed when the problem has no answer.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub(crate) struct InfeasibleReport {
    pub(crate) feasible: bool,
    pub(crate) reason: String,
}

fn write_infeasible(
    writer: &mut dyn Write,
    format: OutputFormat,
    err: &PlanError,
) -> Result<(), CliError> {
    let reason = err
        .infeasibility()
        .map_or_else(|| err.to_string(), ToString::to_string);
    let payload = match format {
        OutputFormat::Text => format!("Infeasible: {reason}\n"),
        OutputFormat::Json => {
            let body = InfeasibleReport {
                feasible: false,
                reason,
            };
            let mut json =
                serde_json::to_string_pretty(&body).map_err(CliError::SerialiseReport)?;
            json.push('\n');
            json
        }
    };
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<SolveConfig, CliError> {
    let merged = SolveArgs::merge_from_layers(layers).map_err(CliError::from)?;
    SolveConfig::try_from(merged)
}
