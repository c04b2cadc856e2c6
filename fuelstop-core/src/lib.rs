//! Core domain types and planning logic for the Fuelstop engine.
//!
//! The crate turns a driving route into a sequence of refuelling stops. It
//! owns the pure parts of the pipeline:
//!
//! - [`geodesic`] distance helpers shared by every other module,
//! - [`sample_waypoints`], which tags route points with cumulative mileage,
//! - the [`StationCatalog`] seam and [`find_stations_in_radius`],
//! - the greedy [`FuelPlanner`] and the caller-facing [`TripSummary`].
//!
//! I/O lives elsewhere. Route acquisition sits behind [`RouteProvider`] and
//! station persistence behind [`StationCatalog`]; adapters for both are
//! provided by `fuelstop-data`.

#![forbid(unsafe_code)]

pub mod cache;
pub mod catalog;
mod error;
pub mod geodesic;
pub mod map;
pub mod planner;
pub mod provider;
mod route;
mod station;
mod summary;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
mod waypoints;

pub use cache::{ExpiringCache, MemoryCache};
pub use catalog::{StationCatalog, StationIndex, find_stations_in_radius, search_bbox};
pub use error::PlanError;
pub use map::{LeafletHtmlRenderer, MapRenderer, OsmLinkRenderer};
pub use planner::{FuelPlan, FuelPlanner, FuelStop, PlannerConfig};
pub use provider::{Geocoder, RouteProvider, RouteProviderError};
pub use route::{RouteGeometry, Waypoint};
pub use station::FuelStation;
pub use summary::{DEFAULT_FUEL_PRICE, TripSummary};
pub use waypoints::{
    DEFAULT_WAYPOINT_INTERVAL_MILES, FINAL_WAYPOINT_TOLERANCE_MILES, sample_waypoints,
};
