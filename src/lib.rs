//! Facade crate for the Fuelstop fuel-stop planner.
//!
//! This crate re-exports the planner, its domain types and the renderers from
//! `fuelstop-core`. The SQLite catalogue, CSV ingest and HTTP route provider
//! from `fuelstop-data` are exposed behind the `data` feature.

#![forbid(unsafe_code)]

pub use fuelstop_core::{
    ExpiringCache, FuelPlan, FuelPlanner, FuelStation, FuelStop, Geocoder, LeafletHtmlRenderer,
    MapRenderer, MemoryCache, OsmLinkRenderer, PlanError, PlannerConfig, RouteGeometry,
    RouteProvider, RouteProviderError, StationCatalog, StationIndex, TripSummary, Waypoint,
    find_stations_in_radius, sample_waypoints,
};

#[cfg(feature = "data")]
pub use fuelstop_data::{
    HttpRouteProvider, HttpRouteProviderConfig, SqliteStationCatalog, StationLoad,
    load_stations_csv, persist_stations_to_sqlite,
};
