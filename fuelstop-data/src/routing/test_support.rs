//! Test utilities for routing providers.
//!
//! This module provides [`StubRouteProvider`] and [`StubGeocoder`],
//! deterministic test doubles that return pre-configured responses without
//! making HTTP requests.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

use fuelstop_core::{Geocoder, RouteGeometry, RouteProvider, RouteProviderError};
use geo::Coord;

/// Stub `RouteProvider` for testing.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use geo::Coord;
/// use fuelstop_core::{RouteGeometry, RouteProvider};
/// use fuelstop_data::routing::test_support::StubRouteProvider;
///
/// let route = RouteGeometry::new(
///     vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }],
///     111_000.0,
///     Duration::from_secs(3_600),
/// )?;
/// let provider = StubRouteProvider::with_route(route.clone());
///
/// assert_eq!(provider.resolve("A", "B"), Ok(route));
/// # Ok::<(), fuelstop_core::PlanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StubRouteProvider {
    response: StubResponse,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Route(RouteGeometry),
    Error(RouteProviderError),
}

impl StubRouteProvider {
    /// Create a provider that returns `route` for any pair of locations.
    #[must_use]
    pub fn with_route(route: RouteGeometry) -> Self {
        Self {
            response: StubResponse::Route(route),
        }
    }

    /// Create a provider that fails with `error` for any pair of locations.
    #[must_use]
    pub fn with_error(error: RouteProviderError) -> Self {
        Self {
            response: StubResponse::Error(error),
        }
    }
}

impl RouteProvider for StubRouteProvider {
    fn resolve(&self, _start: &str, _finish: &str) -> Result<RouteGeometry, RouteProviderError> {
        match &self.response {
            StubResponse::Route(route) => Ok(route.clone()),
            StubResponse::Error(error) => Err(error.clone()),
        }
    }
}

/// Stub `Geocoder` answering from a fixed table and counting lookups.
///
/// Unknown locations fail with [`RouteProviderError::Geocode`].
#[derive(Debug, Clone, Default)]
pub struct StubGeocoder {
    locations: HashMap<String, Coord<f64>>,
    calls: Arc<AtomicUsize>,
}

impl StubGeocoder {
    /// Create a geocoder that knows no locations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `location`.
    #[must_use]
    pub fn with_location(mut self, query: impl Into<String>, location: Coord<f64>) -> Self {
        self.locations.insert(query.into(), location);
        self
    }

    /// Number of lookups served so far, across clones.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for StubGeocoder {
    fn geocode(&self, location: &str) -> Result<Coord<f64>, RouteProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.locations
            .get(location)
            .copied()
            .ok_or_else(|| RouteProviderError::Geocode {
                location: location.to_owned(),
            })
    }
}
