//! Data access and ingestion for the fuel stop planner.
//!
//! Responsibilities:
//! - Load station prices from CSV exports and persist them to SQLite.
//! - Serve persisted stations through [`fuelstop_core::StationCatalog`].
//! - Resolve locations and routes over HTTP for [`fuelstop_core::RouteProvider`].
//!
//! Boundaries:
//! - Do not encode planning rules (live in `fuelstop-core`).
//! - Keep blocking I/O off async executors; the HTTP provider bridges to its
//!   own runtime.
//!
//! Invariants:
//! - Thread-safe by default where feasible.
//! - No global mutable state.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod ingest;
pub mod persist;
pub mod routing;

pub use catalog::{SqliteStationCatalog, SqliteStationCatalogError};
pub use ingest::{StationIngestError, StationLoad, load_stations_csv, load_stations_csv_file};
pub use persist::{PersistStationsError, persist_stations_to_sqlite};
pub use routing::{HttpRouteProvider, HttpRouteProviderConfig, ProviderBuildError};
