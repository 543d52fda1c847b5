//! Focused unit tests covering solve CLI configuration and output.

use super::helpers::{GridNetworkBuilder, utf8_tempdir, write_utf8};
use super::*;
use crate::solve::{
    InfeasibleReport, NetworkSource, OutputFormat, SolveArgs, SolveConfig, SolveOutcome,
    config_from_layers_for_test, run_solve_with,
};
use crate::{ARG_POINTS, ARG_VEHICLES, ARG_WORKERS, ENV_POINTS, ENV_VEHICLES};
use covend_core::SolutionReport;
use covend_data::overpass::DEFAULT_OVERPASS_URL;
use covend_solver::{DEFAULT_ORIGIN, DEFAULT_RADIUS_M, DEFAULT_VEHICLE_CAPACITY};
use rstest::{fixture, rstest};
use std::num::NonZeroUsize;
use std::time::Duration;

#[fixture]
fn minimal_args() -> SolveArgs {
    SolveArgs {
        vehicles: Some(3),
        points: Some(10),
        ..SolveArgs::default()
    }
}

#[rstest]
#[case::missing_vehicles(None, Some(10), ARG_VEHICLES, ENV_VEHICLES)]
#[case::missing_points(Some(3), None, ARG_POINTS, ENV_POINTS)]
fn converting_without_required_fields_errors(
    #[case] vehicles: Option<usize>,
    #[case] points: Option<usize>,
    #[case] field: &'static str,
    #[case] env_var: &'static str,
) {
    let args = SolveArgs {
        vehicles,
        points,
        ..SolveArgs::default()
    };
    let err = SolveConfig::try_from(args).expect_err("missing field should error");
    match err {
        CliError::MissingArgument {
            field: missing,
            env,
        } => {
            assert_eq!(missing, field);
            assert_eq!(env, env_var);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn defaults_mirror_the_lima_setup(minimal_args: SolveArgs) {
    let config = SolveConfig::try_from(minimal_args).expect("config should build");
    assert_eq!(config.vehicles, 3);
    assert_eq!(config.points, 10);
    assert_eq!(config.planner.origin, DEFAULT_ORIGIN);
    assert_eq!(config.planner.radius_m, DEFAULT_RADIUS_M);
    assert_eq!(config.planner.vehicle_capacity, DEFAULT_VEHICLE_CAPACITY);
    assert_eq!(config.planner.seed, None);
    assert_eq!(config.planner.time_limit, None);
    assert_eq!(config.planner.cost_matrix.workers, None);
    assert_eq!(config.format, OutputFormat::Text);
    assert_eq!(
        config.network,
        NetworkSource::Overpass {
            base_url: DEFAULT_OVERPASS_URL.to_owned()
        }
    );
}

#[rstest]
fn explicit_values_reach_the_planner(minimal_args: SolveArgs) {
    let args = SolveArgs {
        capacity: Some(120),
        radius: Some(750.0),
        origin_lat: Some(51.5),
        origin_lon: Some(-0.12),
        seed: Some(9),
        time_limit_secs: Some(30),
        workers: Some(4),
        format: Some(OutputFormat::Json),
        ..minimal_args
    };
    let config = SolveConfig::try_from(args).expect("config should build");
    assert_eq!(config.planner.vehicle_capacity, 120);
    assert_eq!(config.planner.radius_m, 750.0);
    assert_eq!(config.planner.origin.y, 51.5);
    assert_eq!(config.planner.origin.x, -0.12);
    assert_eq!(config.planner.seed, Some(9));
    assert_eq!(config.planner.time_limit, Some(Duration::from_secs(30)));
    assert_eq!(config.planner.cost_matrix.workers, NonZeroUsize::new(4));
    assert_eq!(config.format, OutputFormat::Json);
}

#[rstest]
fn zero_workers_is_rejected(minimal_args: SolveArgs) {
    let args = SolveArgs {
        workers: Some(0),
        ..minimal_args
    };
    match SolveConfig::try_from(args).expect_err("zero workers") {
        CliError::InvalidArgument { field, .. } => assert_eq!(field, ARG_WORKERS),
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
#[case::latitude(Some(95.0), None, "origin-lat")]
#[case::longitude(None, Some(-181.0), "origin-lon")]
#[case::not_a_number(Some(f64::NAN), None, "origin-lat")]
fn out_of_range_origin_is_rejected(
    minimal_args: SolveArgs,
    #[case] lat: Option<f64>,
    #[case] lon: Option<f64>,
    #[case] expected: &'static str,
) {
    let args = SolveArgs {
        origin_lat: lat,
        origin_lon: lon,
        ..minimal_args
    };
    match SolveConfig::try_from(args).expect_err("bad origin") {
        CliError::InvalidArgument { field, .. } => assert_eq!(field, expected),
        other => panic!("expected InvalidArgument, found {other:?}"),
    }
}

#[rstest]
fn both_sources_conflict(minimal_args: SolveArgs) {
    let args = SolveArgs {
        overpass_url: Some("http://localhost:12345/api".to_owned()),
        osm_pbf: Some("lima.osm.pbf".into()),
        ..minimal_args
    };
    assert!(matches!(
        SolveConfig::try_from(args),
        Err(CliError::ConflictingSources)
    ));
}

#[rstest]
fn clap_rejects_both_sources_on_the_command_line() {
    let err = Cli::try_parse_from([
        "covend",
        "solve",
        "--vehicles",
        "2",
        "--points",
        "5",
        "--overpass-url",
        "http://localhost/api",
        "--osm-pbf",
        "lima.osm.pbf",
    ])
    .expect_err("conflicting flags");
    assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
}

#[rstest]
fn clap_accepts_negative_coordinates() {
    let cli = Cli::try_parse_from([
        "covend",
        "solve",
        "--vehicles",
        "4",
        "--points",
        "40",
        "--origin-lat",
        "-12.0432",
        "--origin-lon",
        "-77.0141",
        "--format",
        "json",
    ])
    .expect("arguments should parse");
    let Command::Solve(args) = cli.command;
    assert_eq!(args.origin_lat, Some(-12.0432));
    assert_eq!(args.origin_lon, Some(-77.0141));
    assert_eq!(args.format, Some(OutputFormat::Json));
}

#[rstest]
fn missing_extract_is_reported(minimal_args: SolveArgs) {
    let (_tmp, root) = utf8_tempdir();
    let path = root.join("missing.osm.pbf");
    let config = SolveConfig::try_from(SolveArgs {
        osm_pbf: Some(path.clone()),
        ..minimal_args
    })
    .expect("config should build");
    match config.validate_sources().expect_err("missing extract") {
        CliError::MissingSourceFile { path: reported } => assert_eq!(reported, path),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn existing_extract_passes_validation(minimal_args: SolveArgs) {
    let (_tmp, root) = utf8_tempdir();
    let path = root.join("lima.osm.pbf");
    write_utf8(&path, b"pbf");
    let config = SolveConfig::try_from(SolveArgs {
        osm_pbf: Some(path.clone()),
        ..minimal_args
    })
    .expect("config should build");
    assert_eq!(config.network, NetworkSource::Pbf { path });
    config.validate_sources().expect("extract exists");
}

#[rstest]
#[case(SolveOutcome::Solved, 0)]
#[case(SolveOutcome::Infeasible, 2)]
fn outcomes_map_to_exit_codes(#[case] outcome: SolveOutcome, #[case] code: u8) {
    assert_eq!(outcome.exit_code(), code);
}

#[rstest]
fn json_reports_round_trip_totals(minimal_args: SolveArgs) {
    let args = SolveArgs {
        seed: Some(3),
        format: Some(OutputFormat::Json),
        ..minimal_args
    };
    let mut out = Vec::new();
    let outcome = run_solve_with(args, &GridNetworkBuilder, &mut out).expect("solve");
    assert_eq!(outcome, SolveOutcome::Solved);
    let report: SolutionReport = serde_json::from_slice(&out).expect("JSON report");
    assert_eq!(report.routes.len(), 3);
    let summed: u64 = report.routes.iter().map(|route| route.load).sum();
    assert_eq!(summed, report.total_load);
}

#[rstest]
fn infeasible_json_names_the_reason(minimal_args: SolveArgs) {
    let args = SolveArgs {
        capacity: Some(5),
        seed: Some(3),
        format: Some(OutputFormat::Json),
        ..minimal_args
    };
    let mut out = Vec::new();
    let outcome = run_solve_with(args, &GridNetworkBuilder, &mut out).expect("run");
    assert_eq!(outcome, SolveOutcome::Infeasible);
    let body: InfeasibleReport = serde_json::from_slice(&out).expect("JSON body");
    assert!(!body.feasible);
    assert!(body.reason.contains("largest vehicle holds 5"), "{}", body.reason);
}

#[rstest]
fn zero_vehicles_is_an_error_not_a_report(minimal_args: SolveArgs) {
    let args = SolveArgs {
        vehicles: Some(0),
        ..minimal_args
    };
    let mut out = Vec::new();
    let err = run_solve_with(args, &GridNetworkBuilder, &mut out).expect_err("bad input");
    assert!(matches!(err, CliError::Plan { .. }), "{err:?}");
    assert!(out.is_empty());
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "vehicles": "many" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "vehicles": 2,
            "points": 20,
            "capacity": 300,
            "overpass_url": "http://from-file/api",
        }),
        None,
    );
    composer.push_environment(json!({
        "points": 30,
        "capacity": 400,
    }));
    composer.push_cli(json!({
        "capacity": 500,
    }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.vehicles, 2);
    assert_eq!(config.points, 30);
    assert_eq!(config.planner.vehicle_capacity, 500);
    assert_eq!(
        config.network,
        NetworkSource::Overpass {
            base_url: "http://from-file/api".to_owned()
        }
    );
}
