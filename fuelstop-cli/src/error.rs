//! Error type shared by every `fuelstop` subcommand.
//!
//! Library errors are wrapped rather than flattened so the source chain stays
//! intact for the message printed by `main`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use fuelstop_core::{PlanError, RouteProviderError};
use fuelstop_data::routing::ProviderBuildError;
use fuelstop_data::{PersistStationsError, SqliteStationCatalogError, StationIngestError};
use thiserror::Error;

/// Errors emitted by the Fuelstop CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Command-line arguments were rejected by clap.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Merging config file, environment and CLI layers failed.
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A configured value is out of range.
    #[error("invalid {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: String,
    },
    /// A referenced input path does not exist.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the station database failed.
    #[error(transparent)]
    OpenCatalog(#[from] SqliteStationCatalogError),
    /// Constructing the route provider failed.
    #[error("failed to build route provider: {source}")]
    BuildRouteProvider {
        #[source]
        source: ProviderBuildError,
    },
    /// Geocoding or routing failed.
    #[error("failed to resolve route: {0}")]
    ResolveRoute(#[from] RouteProviderError),
    /// The planner could not produce a plan.
    #[error("failed to plan fuel stops: {0}")]
    Plan(#[from] PlanError),
    /// Reading the station CSV failed.
    #[error("failed to load stations from {path:?}: {source}")]
    LoadStations {
        path: Utf8PathBuf,
        #[source]
        source: StationIngestError,
    },
    /// Writing stations to SQLite failed.
    #[error("failed to persist stations to {path:?}: {source}")]
    PersistStations {
        path: Utf8PathBuf,
        #[source]
        source: PersistStationsError,
    },
    /// Serializing the plan report failed.
    #[error("failed to serialize plan report: {0}")]
    SerializeReport(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Writing the map file failed.
    #[error("failed to write map to {path:?}: {source}")]
    WriteMap {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}
