//! HTTP-based route provider using Nominatim and OSRM.
//!
//! [`HttpRouteProvider`] geocodes free-text locations through a Nominatim
//! `/search` endpoint and fetches driving routes from the OSRM Route API.
//!
//! # Architecture
//!
//! The [`RouteProvider`] and [`Geocoder`] traits are synchronous to keep the
//! planner embeddable in synchronous contexts. This provider bridges the async
//! HTTP calls to the sync interface by blocking on a Tokio runtime internally.
//! Successful lookups are kept in [`ExpiringCache`]s: geocodes for a day and
//! routes for an hour.
//!
//! # Example
//!
//! ```no_run
//! use fuelstop_data::routing::HttpRouteProvider;
//! use fuelstop_core::RouteProvider;
//!
//! let provider = HttpRouteProvider::new()?;
//! let route = provider.resolve("Chicago, IL", "Denver, CO")?;
//! println!("{:.1} miles", route.distance_miles());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{future::Future, sync::Arc, time::Duration};

use fuelstop_core::{
    ExpiringCache, Geocoder, MemoryCache, RouteGeometry, RouteProvider, RouteProviderError,
    cache::{GEOCODE_CACHE_TTL, ROUTE_CACHE_TTL, geocode_cache_key, route_cache_key},
};
use geo::Coord;
use log::{debug, info};
use reqwest::Client;
use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use url::Url;

use super::nominatim::SearchHit;
use super::osrm::RouteResponse;

/// Error type for [`HttpRouteProvider`] construction failures.
#[derive(Debug)]
pub enum ProviderBuildError {
    /// A configured base URL did not parse.
    InvalidUrl {
        /// The rejected URL text.
        url: String,
        /// Parser error.
        source: url::ParseError,
    },
    /// Failed to build the HTTP client.
    HttpClient(reqwest::Error),
    /// Failed to build the Tokio runtime.
    Runtime(std::io::Error),
}

impl std::fmt::Display for ProviderBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUrl { url, source } => write!(f, "invalid base URL {url:?}: {source}"),
            Self::HttpClient(err) => write!(f, "failed to build HTTP client: {err}"),
            Self::Runtime(err) => write!(f, "failed to build Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for ProviderBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidUrl { source, .. } => Some(source),
            Self::HttpClient(err) => Some(err),
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Default user agent for geocoding and routing requests.
pub const DEFAULT_USER_AGENT: &str = "fuelstop/0.1";

/// Public OSRM demo server.
pub const DEFAULT_OSRM_BASE_URL: &str = "http://router.project-osrm.org";

/// Public Nominatim instance.
pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";

const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ROUTE_TIMEOUT_SECS: u64 = 15;

/// Configuration for [`HttpRouteProvider`].
#[derive(Debug, Clone)]
pub struct HttpRouteProviderConfig {
    /// Base URL for the OSRM service.
    pub osrm_base_url: String,
    /// Base URL for the Nominatim service.
    pub geocoder_base_url: String,
    /// Timeout for a single geocoding request.
    pub geocode_timeout: Duration,
    /// Timeout for a single routing request.
    pub route_timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Comma-separated ISO country codes geocoding is restricted to.
    pub country_codes: String,
}

impl Default for HttpRouteProviderConfig {
    fn default() -> Self {
        Self {
            osrm_base_url: DEFAULT_OSRM_BASE_URL.to_string(),
            geocoder_base_url: DEFAULT_GEOCODER_BASE_URL.to_string(),
            geocode_timeout: Duration::from_secs(DEFAULT_GEOCODE_TIMEOUT_SECS),
            route_timeout: Duration::from_secs(DEFAULT_ROUTE_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            country_codes: "us".to_string(),
        }
    }
}

impl HttpRouteProviderConfig {
    /// Set the OSRM base URL.
    #[must_use]
    pub fn with_osrm_base_url(mut self, url: impl Into<String>) -> Self {
        self.osrm_base_url = url.into();
        self
    }

    /// Set the Nominatim base URL.
    #[must_use]
    pub fn with_geocoder_base_url(mut self, url: impl Into<String>) -> Self {
        self.geocoder_base_url = url.into();
        self
    }

    /// Set both request timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, geocode: Duration, route: Duration) -> Self {
        self.geocode_timeout = geocode;
        self.route_timeout = route;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Route provider backed by Nominatim and OSRM over HTTP.
///
/// # Runtime behaviour
///
/// When called from outside any Tokio runtime, the provider uses its own
/// stored runtime. When called from within a multi-threaded Tokio runtime it
/// uses that runtime's handle with [`tokio::task::block_in_place`]. From a
/// `current_thread` runtime it falls back to its own runtime, which may
/// deadlock if the caller's runtime drives IO this request depends on.
///
/// # Errors
///
/// OSRM answers `4xx` with a JSON status body, so those responses surface as
/// [`RouteProviderError::Routing`]; `5xx` responses surface as
/// [`RouteProviderError::Http`]. Failures are never cached.
pub struct HttpRouteProvider {
    client: Client,
    config: HttpRouteProviderConfig,
    search_url: Url,
    runtime: Runtime,
    geocode_cache: Arc<dyn ExpiringCache<Coord<f64>>>,
    route_cache: Arc<dyn ExpiringCache<RouteGeometry>>,
}

impl std::fmt::Debug for HttpRouteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRouteProvider")
            .field("client", &self.client)
            .field("config", &self.config)
            .field("runtime", &"<tokio::runtime::Runtime>")
            .finish_non_exhaustive()
    }
}

impl HttpRouteProvider {
    /// Create a provider pointed at the public services.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or Tokio runtime fails to build.
    pub fn new() -> Result<Self, ProviderBuildError> {
        Self::with_config(HttpRouteProviderConfig::default())
    }

    /// Create a provider with explicit configuration and in-memory caches.
    ///
    /// # Errors
    ///
    /// Returns an error if a base URL is invalid or the HTTP client or Tokio
    /// runtime fails to build.
    pub fn with_config(config: HttpRouteProviderConfig) -> Result<Self, ProviderBuildError> {
        Url::parse(&config.osrm_base_url).map_err(|source| ProviderBuildError::InvalidUrl {
            url: config.osrm_base_url.clone(),
            source,
        })?;
        let search_text = format!("{}/search", config.geocoder_base_url.trim_end_matches('/'));
        let search_url =
            Url::parse(&search_text).map_err(|source| ProviderBuildError::InvalidUrl {
                url: config.geocoder_base_url.clone(),
                source,
            })?;

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.geocode_timeout.min(config.route_timeout))
            .build()
            .map_err(ProviderBuildError::HttpClient)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ProviderBuildError::Runtime)?;
        Ok(Self {
            client,
            config,
            search_url,
            runtime,
            geocode_cache: Arc::new(MemoryCache::new()),
            route_cache: Arc::new(MemoryCache::new()),
        })
    }

    /// Replace the geocode cache.
    #[must_use]
    pub fn with_geocode_cache(mut self, cache: Arc<dyn ExpiringCache<Coord<f64>>>) -> Self {
        self.geocode_cache = cache;
        self
    }

    /// Replace the route cache.
    #[must_use]
    pub fn with_route_cache(mut self, cache: Arc<dyn ExpiringCache<RouteGeometry>>) -> Self {
        self.route_cache = cache;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &HttpRouteProviderConfig {
        &self.config
    }

    /// Build the Nominatim search URL for `location`.
    fn build_search_url(&self, location: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("q", location)
            .append_pair("format", "json")
            .append_pair("limit", "1")
            .append_pair("countrycodes", &self.config.country_codes);
        url
    }

    /// Build the OSRM Route API URL between two coordinates.
    ///
    /// The URL format is:
    /// `{base_url}/route/v1/driving/{lon},{lat};{lon},{lat}?overview=full&geometries=geojson&steps=true`
    fn build_route_url(&self, start: Coord<f64>, finish: Coord<f64>) -> String {
        format!(
            "{}/route/v1/driving/{},{};{},{}?overview=full&geometries=geojson&steps=true",
            self.config.osrm_base_url.trim_end_matches('/'),
            start.x,
            start.y,
            finish.x,
            finish.y
        )
    }

    async fn geocode_async(&self, location: &str) -> Result<Coord<f64>, RouteProviderError> {
        let url = self.build_search_url(location);
        let timeout = self.config.geocode_timeout;

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(&err, url.as_str(), timeout))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(&err, url.as_str(), timeout))?;

        let hits: Vec<SearchHit> =
            response
                .json()
                .await
                .map_err(|err| RouteProviderError::Parse {
                    message: err.to_string(),
                })?;

        convert_search_hits(location, &hits)
    }

    async fn fetch_route_async(
        &self,
        start: Coord<f64>,
        finish: Coord<f64>,
    ) -> Result<RouteGeometry, RouteProviderError> {
        let url = self.build_route_url(start, finish);
        let timeout = self.config.route_timeout;

        let mut response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| convert_reqwest_error(&err, &url, timeout))?;
        if response.status().is_server_error() {
            response = response
                .error_for_status()
                .map_err(|err| convert_reqwest_error(&err, &url, timeout))?;
        }

        let route_response: RouteResponse =
            response
                .json()
                .await
                .map_err(|err| RouteProviderError::Parse {
                    message: err.to_string(),
                })?;

        convert_route_response(route_response, start, finish)
    }

    /// Drive `future` to completion from synchronous code.
    fn block_on<F: Future>(&self, future: F) -> F::Output {
        // block_in_place requires a multi-threaded runtime; for current_thread
        // runtimes we fall back to our own stored runtime.
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| handle.block_on(future))
            }
            _ => self.runtime.block_on(future),
        }
    }
}

impl Geocoder for HttpRouteProvider {
    fn geocode(&self, location: &str) -> Result<Coord<f64>, RouteProviderError> {
        let key = geocode_cache_key(location);
        if let Some(coord) = self.geocode_cache.get(&key) {
            debug!("geocode cache hit for {location}");
            return Ok(coord);
        }

        let coord = self.block_on(self.geocode_async(location))?;
        self.geocode_cache.insert(key, coord, GEOCODE_CACHE_TTL);
        Ok(coord)
    }
}

impl RouteProvider for HttpRouteProvider {
    fn resolve(&self, start: &str, finish: &str) -> Result<RouteGeometry, RouteProviderError> {
        let key = route_cache_key(start, finish);
        if let Some(route) = self.route_cache.get(&key) {
            debug!("route cache hit for {start} -> {finish}");
            return Ok(route);
        }

        let start_coord = self.geocode(start)?;
        let finish_coord = self.geocode(finish)?;
        let route = self.block_on(self.fetch_route_async(start_coord, finish_coord))?;
        info!(
            "resolved {start} -> {finish}: {:.1} miles, {} points",
            route.distance_miles(),
            route.coordinates().len()
        );
        self.route_cache.insert(key, route.clone(), ROUTE_CACHE_TTL);
        Ok(route)
    }
}

/// Convert a reqwest error to a `RouteProviderError`.
fn convert_reqwest_error(
    error: &reqwest::Error,
    url: &str,
    timeout: Duration,
) -> RouteProviderError {
    if error.is_timeout() {
        return RouteProviderError::Timeout {
            url: url.to_owned(),
            timeout_secs: timeout.as_secs(),
        };
    }

    if let Some(status) = error.status() {
        return RouteProviderError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    RouteProviderError::Network {
        url: url.to_owned(),
        message: error.to_string(),
    }
}

fn convert_search_hits(
    location: &str,
    hits: &[SearchHit],
) -> Result<Coord<f64>, RouteProviderError> {
    let Some(hit) = hits.first() else {
        return Err(RouteProviderError::Geocode {
            location: location.to_owned(),
        });
    };
    hit.coordinate().ok_or_else(|| RouteProviderError::Parse {
        message: format!(
            "geocoder returned malformed coordinates ({}, {}) for {location}",
            hit.lat, hit.lon
        ),
    })
}

/// Convert an OSRM response to a `RouteGeometry`.
/// Validate an OSRM response and pin the route to the geocoded endpoints.
fn convert_route_response(
    response: RouteResponse,
    start: Coord<f64>,
    finish: Coord<f64>,
) -> Result<RouteGeometry, RouteProviderError> {
    if !response.is_ok() {
        return Err(RouteProviderError::Routing {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }

    let Some(route) = response.routes.into_iter().next() else {
        return Err(RouteProviderError::Routing {
            code: "NoRoute".to_string(),
            message: "response contained no routes".to_string(),
        });
    };

    if !(route.duration.is_finite() && route.duration >= 0.0) {
        return Err(RouteProviderError::InvalidRoute {
            reason: format!("route duration must be non-negative, found {}", route.duration),
        });
    }

    let coordinates = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[x, y]| Coord { x, y })
        .collect();

    let duration = Duration::try_from_secs_f64(route.duration).map_err(|err| {
        RouteProviderError::InvalidRoute {
            reason: format!("route duration {} is out of range: {err}", route.duration),
        }
    })?;

    RouteGeometry::new(coordinates, route.distance, duration)
        .map(|geometry| geometry.with_endpoints(start, finish))
        .map_err(|err| RouteProviderError::InvalidRoute {
            reason: err.to_string(),
        })
}
