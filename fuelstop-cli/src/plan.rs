//! Plan command implementation for the Fuelstop CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use fuelstop_core::{FuelStop, MapRenderer, OsmLinkRenderer, TripSummary};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::trip::{
    DefaultTripServicesBuilder, PlannedTrip, TripConfig, TripOptions, TripServicesBuilder,
    plan_trip,
};
use crate::{
    ARG_FINISH, ARG_GEOCODER_BASE_URL, ARG_MAX_RANGE, ARG_MPG, ARG_OSRM_BASE_URL, ARG_START,
    ARG_STATIONS_DB, CliError, ENV_PLAN_FINISH, ENV_PLAN_START,
};

/// Route points included in the report.
pub(crate) const REPORT_GEOMETRY_POINTS: usize = 100;

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "plan",
    long_about = "Resolve a driving route between two US locations, choose the \
                 cheapest fuel stops along it from the station database and \
                 print the plan as JSON.",
    about = "Plan fuel stops along a route"
)]
#[ortho_config(prefix = "FUELSTOP")]
pub(crate) struct PlanArgs {
    /// Start location, e.g. "Chicago, IL".
    #[arg(value_name = ARG_START)]
    #[serde(default)]
    pub(crate) start: Option<String>,
    /// Finish location, e.g. "Denver, CO".
    #[arg(value_name = ARG_FINISH)]
    #[serde(default)]
    pub(crate) finish: Option<String>,
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

impl PlanArgs {
    pub(crate) fn into_config(self) -> Result<TripConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        TripConfig::try_from(merged)
    }
}

impl TryFrom<PlanArgs> for TripConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let start = required_location(args.start, ARG_START, ENV_PLAN_START)?;
        let finish = required_location(args.finish, ARG_FINISH, ENV_PLAN_FINISH)?;
        TripConfig::try_from(TripOptions {
            start,
            finish,
            stations_db: args.stations_db,
            osrm_base_url: args.osrm_base_url,
            geocoder_base_url: args.geocoder_base_url,
            max_range_miles: args.max_range,
            mpg: args.mpg,
        })
    }
}

/// Treat a missing or blank location as absent.
pub(crate) fn required_location(
    value: Option<String>,
    field: &'static str,
    env: &'static str,
) -> Result<String, CliError> {
    value
        .map(|location| location.trim().to_owned())
        .filter(|location| !location.is_empty())
        .ok_or(CliError::MissingArgument { field, env })
}

/// JSON document printed by `plan`.
#[derive(Debug, Serialize)]
pub(crate) struct PlanReport {
    pub(crate) route: RouteReport,
    pub(crate) fuel_stops: Vec<FuelStop>,
    #[serde(flatten)]
    pub(crate) summary: TripSummary,
    pub(crate) map_url: String,
    pub(crate) response_time_ms: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct RouteReport {
    pub(crate) start_location: String,
    pub(crate) finish_location: String,
    pub(crate) distance_miles: f64,
    pub(crate) duration_hours: f64,
    /// Leading `[longitude, latitude]` pairs of the route.
    pub(crate) geometry: Vec<[f64; 2]>,
}

impl PlanReport {
    pub(crate) fn new(config: &TripConfig, trip: PlannedTrip) -> Result<Self, CliError> {
        let PlannedTrip {
            route,
            plan,
            elapsed,
        } = trip;
        let summary = TripSummary::from_plan(&route, &plan.stops, config.planner.mpg)?;
        let map_url = OsmLinkRenderer.render(&route, &plan.stops);
        let geometry = route
            .coordinates()
            .iter()
            .take(REPORT_GEOMETRY_POINTS)
            .map(|coord| [coord.x, coord.y])
            .collect();
        Ok(Self {
            route: RouteReport {
                start_location: config.start.clone(),
                finish_location: config.finish.clone(),
                distance_miles: summary.total_distance_miles,
                duration_hours: summary.duration_hours,
                geometry,
            },
            fuel_stops: plan.stops,
            summary,
            map_url,
            response_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        })
    }
}

pub(crate) fn run_plan(args: PlanArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_plan_with(args, &DefaultTripServicesBuilder, &mut stdout)
}

pub(crate) fn run_plan_with(
    args: PlanArgs,
    builder: &dyn TripServicesBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    let trip = plan_trip(&config, builder)?;
    let report = PlanReport::new(&config, trip)?;
    write_report(writer, &report)
}

fn write_report(writer: &mut dyn Write, report: &PlanReport) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(report).map_err(CliError::SerializeReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<TripConfig, CliError> {
    let merged = PlanArgs::merge_from_layers(layers).map_err(CliError::from)?;
    TripConfig::try_from(merged)
}
