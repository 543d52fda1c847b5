//! Command-line interface for the covend routing engine.
//!
//! `covend solve` samples demand points around a depot, prices them over an
//! OpenStreetMap road network and prints the routes of a capacitated fleet.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod solve;

pub use error::CliError;
pub use solve::SolveOutcome;

const ARG_VEHICLES: &str = "vehicles";
const ARG_POINTS: &str = "points";
const ARG_WORKERS: &str = "workers";
const ARG_OVERPASS_URL: &str = "overpass-url";
const ARG_OSM_PBF: &str = "osm-pbf";
const ENV_VEHICLES: &str = "COVEND_CMDS_SOLVE_VEHICLES";
const ENV_POINTS: &str = "COVEND_CMDS_SOLVE_POINTS";

/// Run the covend CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] for anything other than a report or an infeasible
/// problem.
pub fn run() -> Result<SolveOutcome, CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Solve(args) => solve::run_solve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "covend",
    about = "Capacitated vehicle routing over OpenStreetMap road networks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sample demand points and route a fleet through them.
    Solve(solve::SolveArgs),
}

#[cfg(test)]
mod tests;
