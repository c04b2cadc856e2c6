//! Resolve free-text locations into coordinates and driving routes.
//!
//! [`Geocoder`] turns a location string into a coordinate and
//! [`RouteProvider`] turns a start/finish pair into a [`RouteGeometry`]. Both
//! are synchronous so the planner stays embeddable; HTTP-backed
//! implementations live in `fuelstop-data`.

use geo::Coord;
use thiserror::Error;

use crate::RouteGeometry;

/// Errors from [`Geocoder::geocode`] and [`RouteProvider::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteProviderError {
    /// The geocoder returned no match for a location.
    #[error("could not find location: {location}")]
    Geocode {
        /// Location text as supplied by the caller.
        location: String,
    },
    /// The routing service answered but could not produce a route.
    #[error("routing failed ({code}): {message}")]
    Routing {
        /// Service status code, e.g. `NoRoute`.
        code: String,
        /// Message returned alongside the code, possibly empty.
        message: String,
    },
    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Request URL.
        url: String,
        /// Configured timeout in whole seconds.
        timeout_secs: u64,
    },
    /// The service answered with a non-success HTTP status.
    #[error("request to {url} failed with HTTP {status}: {message}")]
    Http {
        /// Request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Error detail from the HTTP client.
        message: String,
    },
    /// The request could not reach the service.
    #[error("network error contacting {url}: {message}")]
    Network {
        /// Request URL.
        url: String,
        /// Error detail from the HTTP client.
        message: String,
    },
    /// The response body was not in the expected format.
    #[error("failed to parse response: {message}")]
    Parse {
        /// Decoder error detail.
        message: String,
    },
    /// The service returned a route the planner cannot use.
    #[error("service returned an unusable route: {reason}")]
    InvalidRoute {
        /// Why the route was rejected.
        reason: String,
    },
}

impl RouteProviderError {
    /// Whether the failure came from the transport rather than the request.
    ///
    /// Transport failures may succeed on retry; the others will not.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Http { .. } | Self::Network { .. }
        )
    }
}

/// Resolve free-text locations into coordinates.
///
/// # Examples
///
/// ```rust
/// use geo::Coord;
/// use fuelstop_core::{Geocoder, RouteProviderError};
///
/// struct Fixed;
///
/// impl Geocoder for Fixed {
///     fn geocode(&self, location: &str) -> Result<Coord<f64>, RouteProviderError> {
///         match location {
///             "Chicago, IL" => Ok(Coord { x: -87.63, y: 41.88 }),
///             _ => Err(RouteProviderError::Geocode { location: location.into() }),
///         }
///     }
/// }
///
/// assert!(Fixed.geocode("Chicago, IL").is_ok());
/// assert!(Fixed.geocode("Atlantis").is_err());
/// ```
pub trait Geocoder {
    /// Return the coordinate (`x = longitude`, `y = latitude`) for `location`.
    fn geocode(&self, location: &str) -> Result<Coord<f64>, RouteProviderError>;
}

/// Resolve a driving route between two free-text locations.
pub trait RouteProvider {
    /// Geocode `start` and `finish` and return the route between them.
    ///
    /// Implementations must return [`RouteProviderError::Geocode`] naming the
    /// location that could not be resolved.
    fn resolve(&self, start: &str, finish: &str) -> Result<RouteGeometry, RouteProviderError>;
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn geocode(&self, location: &str) -> Result<Coord<f64>, RouteProviderError> {
        (**self).geocode(location)
    }
}

impl<T: RouteProvider + ?Sized> RouteProvider for &T {
    fn resolve(&self, start: &str, finish: &str) -> Result<RouteGeometry, RouteProviderError> {
        (**self).resolve(start, finish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(RouteProviderError::Timeout { url: "u".into(), timeout_secs: 10 }, true)]
    #[case(RouteProviderError::Network { url: "u".into(), message: "m".into() }, true)]
    #[case(RouteProviderError::Geocode { location: "Atlantis".into() }, false)]
    #[case(RouteProviderError::Parse { message: "m".into() }, false)]
    fn classifies_transport_failures(#[case] err: RouteProviderError, #[case] expected: bool) {
        assert_eq!(err.is_transport(), expected);
    }

    #[rstest]
    fn geocode_error_names_the_location() {
        let err = RouteProviderError::Geocode {
            location: "Atlantis, ZZ".into(),
        };
        assert_eq!(err.to_string(), "could not find location: Atlantis, ZZ");
    }
}
