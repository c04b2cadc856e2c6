//! Map command implementation for the Fuelstop CLI.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fuelstop_core::{LeafletHtmlRenderer, MapRenderer};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::plan::required_location;
use crate::trip::{
    DefaultTripServicesBuilder, TripConfig, TripOptions, TripServicesBuilder, plan_trip,
};
use crate::{
    ARG_FINISH, ARG_GEOCODER_BASE_URL, ARG_MAX_RANGE, ARG_MPG, ARG_OSRM_BASE_URL, ARG_OUTPUT,
    ARG_START, ARG_STATIONS_DB, CliError, ENV_MAP_FINISH, ENV_MAP_START,
};

/// CLI arguments for the `map` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "map",
    long_about = "Plan fuel stops like `plan` and render the route, start, \
                 finish and each stop as a standalone Leaflet HTML page.",
    about = "Render a planned route as an HTML map"
)]
#[ortho_config(prefix = "FUELSTOP")]
pub(crate) struct MapArgs {
    /// Start location, e.g. "Chicago, IL".
    #[arg(value_name = ARG_START)]
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// Finish location, e.g. "Denver, CO".
    #[arg(value_name = ARG_FINISH)]
    #[serde(default)]
    pub(crate) finish: Option<String>,
    /// Write the page here instead of standard output.
    #[arg(long = ARG_OUTPUT, short = 'o', value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Path to the SQLite station database written by `load-stations`.
    #[arg(long = ARG_STATIONS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) stations_db: Option<Utf8PathBuf>,
    /// Base URL for the OSRM routing service.
    #[arg(long = ARG_OSRM_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) osrm_base_url: Option<String>,
    /// Base URL for the Nominatim geocoding service.
    #[arg(long = ARG_GEOCODER_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_base_url: Option<String>,
    /// Vehicle range on a full tank, in miles.
    #[arg(long = ARG_MAX_RANGE, value_name = "miles")]
    #[serde(default)]
    pub(crate) max_range: Option<f64>,
    /// Vehicle fuel economy in miles per gallon.
    #[arg(long = ARG_MPG, value_name = "mpg")]
    #[serde(default)]
    pub(crate) mpg: Option<f64>,
}

/// Resolved `map` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct MapConfig {
    pub(crate) trip: TripConfig,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl MapArgs {
    pub(crate) fn into_config(self) -> Result<MapConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        MapConfig::try_from(merged)
    }
}

impl TryFrom<MapArgs> for MapConfig {
    type Error = CliError;

    fn try_from(args: MapArgs) -> Result<Self, Self::Error> {
        let start = required_location(args.start, ARG_START, ENV_MAP_START)?;
        let finish = required_location(args.finish, ARG_FINISH, ENV_MAP_FINISH)?;
        let trip = TripConfig::try_from(TripOptions {
            start,
            finish,
            stations_db: args.stations_db,
            osrm_base_url: args.osrm_base_url,
            geocoder_base_url: args.geocoder_base_url,
            max_range_miles: args.max_range,
            mpg: args.mpg,
        })?;
        Ok(Self {
            trip,
            output: args.output,
        })
    }
}

pub(crate) fn run_map(args: MapArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_map_with(args, &DefaultTripServicesBuilder, &mut stdout)
}

pub(crate) fn run_map_with(
    args: MapArgs,
    builder: &dyn TripServicesBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.trip.validate_sources()?;
    let trip = plan_trip(&config.trip, builder)?;
    let html = LeafletHtmlRenderer::new()
        .with_labels(config.trip.start.as_str(), config.trip.finish.as_str())
        .render(&trip.route, &trip.plan.stops);

    match config.output.as_deref() {
        Some(path) => write_map_file(path, &html, writer),
        None => writer
            .write_all(html.as_bytes())
            .map_err(CliError::WriteOutput),
    }
}

fn write_map_file(path: &Utf8Path, html: &str, writer: &mut dyn Write) -> Result<(), CliError> {
    fuelstop_fs::write_utf8_file(path, html).map_err(|source| CliError::WriteMap {
        path: path.to_path_buf(),
        source,
    })?;
    info!("wrote map to {path}");
    writeln!(writer, "{path}").map_err(CliError::WriteOutput)
}
