//! Station loading command for the Fuelstop CLI.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use fuelstop_core::Geocoder;
use fuelstop_data::routing::{
    HttpRouteProvider, HttpRouteProviderConfig, NOMINATIM_MIN_INTERVAL, ThrottledGeocoder,
};
use fuelstop_data::{StationLoad, load_stations_csv_file, persist_stations_to_sqlite};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::trip::require_existing;
use crate::{
    ARG_CSV, ARG_GEOCODER_BASE_URL, ARG_LIMIT, ARG_STATIONS_DB, CliError, DEFAULT_STATIONS_DB,
    ENV_LOAD_CSV,
};

/// CLI arguments for the `load-stations` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "load-stations",
    long_about = "Read an OPIS truck stop price export, geocode each station's \
                 city and state, and replace the contents of the station \
                 database with the result. Geocoding is throttled to one \
                 request per second.",
    about = "Load station prices into the station database"
)]
#[ortho_config(prefix = "FUELSTOP")]
pub(crate) struct LoadStationsArgs {
    /// Path to the CSV price export.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) csv: Option<Utf8PathBuf>,
    /// Path to the SQLite station database to (re)create.
    #[arg(long = ARG_STATIONS_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) stations_db: Option<Utf8PathBuf>,
    /// Stop after loading this many stations.
    #[arg(long = ARG_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Base URL for the Nominatim geocoding service.
    #[arg(long = ARG_GEOCODER_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) geocoder_base_url: Option<String>,
}

/// Resolved `load-stations` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct LoadStationsConfig {
    pub(crate) csv: Utf8PathBuf,
    pub(crate) stations_db: Utf8PathBuf,
    pub(crate) limit: Option<usize>,
    pub(crate) provider: HttpRouteProviderConfig,
}

impl LoadStationsArgs {
    pub(crate) fn into_config(self) -> Result<LoadStationsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LoadStationsConfig::try_from(merged)
    }
}

impl TryFrom<LoadStationsArgs> for LoadStationsConfig {
    type Error = CliError;

    fn try_from(args: LoadStationsArgs) -> Result<Self, Self::Error> {
        let csv = args.csv.ok_or(CliError::MissingArgument {
            field: ARG_CSV,
            env: ENV_LOAD_CSV,
        })?;
        if args.limit == Some(0) {
            return Err(CliError::InvalidArgument {
                field: ARG_LIMIT,
                reason: "must be at least 1".to_owned(),
            });
        }
        let mut provider = HttpRouteProviderConfig::default();
        if let Some(url) = args.geocoder_base_url {
            provider = provider.with_geocoder_base_url(url);
        }
        Ok(Self {
            csv,
            stations_db: args
                .stations_db
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STATIONS_DB)),
            limit: args.limit,
            provider,
        })
    }
}

/// Builds the geocoder used to locate stations.
pub(crate) trait StationGeocoderBuilder {
    fn build(&self, config: &LoadStationsConfig) -> Result<Box<dyn Geocoder>, CliError>;
}

pub(crate) struct DefaultStationGeocoderBuilder;

impl StationGeocoderBuilder for DefaultStationGeocoderBuilder {
    fn build(&self, config: &LoadStationsConfig) -> Result<Box<dyn Geocoder>, CliError> {
        let provider = HttpRouteProvider::with_config(config.provider.clone())
            .map_err(|source| CliError::BuildRouteProvider { source })?;
        Ok(Box::new(ThrottledGeocoder::new(
            provider,
            NOMINATIM_MIN_INTERVAL,
        )))
    }
}

pub(crate) fn run_load_stations(args: LoadStationsArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_load_stations_with(args, &DefaultStationGeocoderBuilder, &mut stdout)
}

pub(crate) fn run_load_stations_with(
    args: LoadStationsArgs,
    builder: &dyn StationGeocoderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.csv, ARG_CSV)?;
    let geocoder = builder.build(&config)?;

    let load = load_stations_csv_file(&config.csv, geocoder.as_ref(), config.limit).map_err(
        |source| CliError::LoadStations {
            path: config.csv.clone(),
            source,
        },
    )?;
    persist_stations_to_sqlite(&config.stations_db, &load.stations).map_err(|source| {
        CliError::PersistStations {
            path: config.stations_db.clone(),
            source,
        }
    })?;
    info!(
        "stored {} stations in {}",
        load.stations.len(),
        config.stations_db
    );
    write_summary(writer, &config, &load)
}

fn write_summary(
    writer: &mut dyn Write,
    config: &LoadStationsConfig,
    load: &StationLoad,
) -> Result<(), CliError> {
    writeln!(
        writer,
        "loaded {} stations into {} ({} skipped: {} invalid, {} unlocated; {} geocoder requests)",
        load.stations.len(),
        config.stations_db,
        load.skipped(),
        load.skipped_invalid,
        load.skipped_unlocated,
        load.geocode_requests,
    )
    .map_err(CliError::WriteOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<LoadStationsConfig, CliError> {
    let merged = LoadStationsArgs::merge_from_layers(layers).map_err(CliError::from)?;
    LoadStationsConfig::try_from(merged)
}
