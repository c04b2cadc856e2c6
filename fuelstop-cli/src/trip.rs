//! Shared configuration and wiring for commands that plan a trip.

use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use fuelstop_core::{
    FuelPlan, FuelPlanner, PlannerConfig, RouteGeometry, RouteProvider, StationCatalog,
};
use fuelstop_data::SqliteStationCatalog;
use fuelstop_data::routing::{HttpRouteProvider, HttpRouteProviderConfig};
use log::info;

use crate::{ARG_MAX_RANGE, ARG_MPG, ARG_STATIONS_DB, CliError, DEFAULT_STATIONS_DB};

/// Resolved configuration shared by `plan` and `map`.
#[derive(Debug, Clone)]
pub(crate) struct TripConfig {
    /// Free-text start location.
    pub(crate) start: String,
    /// Free-text finish location.
    pub(crate) finish: String,
    /// Path to the SQLite station database.
    pub(crate) stations_db: Utf8PathBuf,
    /// Geocoding and routing endpoints.
    pub(crate) provider: HttpRouteProviderConfig,
    /// Vehicle and search parameters.
    pub(crate) planner: PlannerConfig,
}

/// Raw trip options as merged from CLI, environment and config file.
#[derive(Debug, Default)]
pub(crate) struct TripOptions {
    pub(crate) start: String,
    pub(crate) finish: String,
    pub(crate) stations_db: Option<Utf8PathBuf>,
    pub(crate) osrm_base_url: Option<String>,
    pub(crate) geocoder_base_url: Option<String>,
    pub(crate) max_range_miles: Option<f64>,
    pub(crate) mpg: Option<f64>,
}

impl TryFrom<TripOptions> for TripConfig {
    type Error = CliError;

    fn try_from(options: TripOptions) -> Result<Self, Self::Error> {
        let mut provider = HttpRouteProviderConfig::default();
        if let Some(url) = options.osrm_base_url {
            provider = provider.with_osrm_base_url(url);
        }
        if let Some(url) = options.geocoder_base_url {
            provider = provider.with_geocoder_base_url(url);
        }

        let mut planner = PlannerConfig::default();
        if let Some(range) = options.max_range_miles {
            planner.max_range_miles = require_positive(range, ARG_MAX_RANGE)?;
        }
        if let Some(mpg) = options.mpg {
            planner.mpg = require_positive(mpg, ARG_MPG)?;
        }
        // Only the range can still be out of step with the fixed margins.
        planner
            .validate()
            .map_err(|err| CliError::InvalidArgument {
                field: ARG_MAX_RANGE,
                reason: err.to_string(),
            })?;

        Ok(Self {
            start: options.start,
            finish: options.finish,
            stations_db: options
                .stations_db
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_STATIONS_DB)),
            provider,
            planner,
        })
    }
}

fn require_positive(value: f64, field: &'static str) -> Result<f64, CliError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CliError::InvalidArgument {
            field,
            reason: format!("must be a positive number, found {value}"),
        })
    }
}

impl TripConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.stations_db, ARG_STATIONS_DB)
    }
}

/// Check that `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match fuelstop_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Route provider and station catalogue used to plan one trip.
pub(crate) struct TripServices {
    pub(crate) routes: Box<dyn RouteProvider>,
    pub(crate) catalog: Box<dyn StationCatalog>,
}

/// Builds the services for the current invocation.
pub(crate) trait TripServicesBuilder {
    fn build(&self, config: &TripConfig) -> Result<TripServices, CliError>;
}

pub(crate) struct DefaultTripServicesBuilder;

impl TripServicesBuilder for DefaultTripServicesBuilder {
    fn build(&self, config: &TripConfig) -> Result<TripServices, CliError> {
        let catalog = SqliteStationCatalog::open(&config.stations_db)?;
        info!(
            "opened {} stations from {}",
            catalog.len(),
            config.stations_db
        );
        let routes = HttpRouteProvider::with_config(config.provider.clone())
            .map_err(|source| CliError::BuildRouteProvider { source })?;
        Ok(TripServices {
            routes: Box::new(routes),
            catalog: Box::new(catalog),
        })
    }
}

/// A resolved route with its planned stops.
#[derive(Debug)]
pub(crate) struct PlannedTrip {
    pub(crate) route: RouteGeometry,
    pub(crate) plan: FuelPlan,
    pub(crate) elapsed: Duration,
}

/// Resolve the route for `config` and plan stops along it.
pub(crate) fn plan_trip(
    config: &TripConfig,
    builder: &dyn TripServicesBuilder,
) -> Result<PlannedTrip, CliError> {
    let started = Instant::now();
    let services = builder.build(config)?;
    let route = services.routes.resolve(&config.start, &config.finish)?;
    let planner = FuelPlanner::with_config(services.catalog.as_ref(), config.planner.clone());
    let plan = planner.plan(&route)?;
    info!(
        "planned {} stops over {:.1} miles",
        plan.stops.len(),
        route.distance_miles()
    );
    Ok(PlannedTrip {
        route,
        plan,
        elapsed: started.elapsed(),
    })
}
