//! HTTP-based route providers for geocoding and routing services.
//!
//! This module provides [`HttpRouteProvider`], an implementation of
//! [`fuelstop_core::RouteProvider`] and [`fuelstop_core::Geocoder`] that
//! resolves locations through Nominatim and routes through OSRM.
//!
//! # Example
//!
//! ```no_run
//! use fuelstop_data::routing::{HttpRouteProvider, HttpRouteProviderConfig};
//! use fuelstop_core::RouteProvider;
//! use std::time::Duration;
//!
//! let config = HttpRouteProviderConfig::default()
//!     .with_osrm_base_url("http://localhost:5000")
//!     .with_timeouts(Duration::from_secs(5), Duration::from_secs(30))
//!     .with_user_agent("my-app/1.0");
//! let provider = HttpRouteProvider::with_config(config)?;
//!
//! let route = provider.resolve("Chicago, IL", "Denver, CO")?;
//! println!("Route: {:.1} miles", route.distance_miles());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod nominatim;
mod osrm;
mod provider;
mod throttle;

#[doc(hidden)]
pub mod test_support;

pub use provider::{
    DEFAULT_GEOCODER_BASE_URL, DEFAULT_OSRM_BASE_URL, DEFAULT_USER_AGENT, HttpRouteProvider,
    HttpRouteProviderConfig, ProviderBuildError,
};
pub use throttle::{NOMINATIM_MIN_INTERVAL, ThrottledGeocoder};
