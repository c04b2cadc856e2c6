//! Command-line interface for planning fuel stops along US driving routes.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod load;
mod map;
mod plan;
mod trip;

pub use error::CliError;

use load::{LoadStationsArgs, run_load_stations};
use map::{MapArgs, run_map};
use plan::{PlanArgs, run_plan};

const ARG_START: &str = "start";
const ARG_FINISH: &str = "finish";
const ARG_STATIONS_DB: &str = "stations-db";
const ARG_OSRM_BASE_URL: &str = "osrm-base-url";
const ARG_GEOCODER_BASE_URL: &str = "geocoder-base-url";
const ARG_MAX_RANGE: &str = "max-range";
const ARG_MPG: &str = "mpg";
const ARG_OUTPUT: &str = "output";
const ARG_CSV: &str = "csv";
const ARG_LIMIT: &str = "limit";
const ENV_PLAN_START: &str = "FUELSTOP_CMDS_PLAN_START";
const ENV_PLAN_FINISH: &str = "FUELSTOP_CMDS_PLAN_FINISH";
const ENV_MAP_START: &str = "FUELSTOP_CMDS_MAP_START";
const ENV_MAP_FINISH: &str = "FUELSTOP_CMDS_MAP_FINISH";
const ENV_LOAD_CSV: &str = "FUELSTOP_CMDS_LOAD_STATIONS_CSV";

/// Station database used when no path is configured.
const DEFAULT_STATIONS_DB: &str = "stations.db";

/// Run the Fuelstop CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when argument parsing, configuration, routing,
/// planning or output fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Plan(args) => run_plan(args),
        Command::Map(args) => run_map(args),
        Command::LoadStations(args) => run_load_stations(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "fuelstop",
    about = "Plan the cheapest fuel stops along a US driving route",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan fuel stops between two locations and print them as JSON.
    Plan(PlanArgs),
    /// Render the planned route and stops as an HTML map.
    Map(MapArgs),
    /// Load station prices from a CSV export into the station database.
    LoadStations(LoadStationsArgs),
}

#[cfg(test)]
mod tests;
