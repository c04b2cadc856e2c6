//! Rate limiting for geocoders with a fair-use policy.

use std::{
    sync::{Mutex, PoisonError},
    thread,
    time::{Duration, Instant},
};

use fuelstop_core::{Geocoder, RouteProviderError};
use geo::Coord;

/// Minimum spacing Nominatim asks bulk clients to leave between requests.
pub const NOMINATIM_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Wraps a [`Geocoder`] so consecutive lookups are at least `interval` apart.
///
/// The wrapper sleeps the calling thread; lookups from several threads are
/// serialised.
#[derive(Debug)]
pub struct ThrottledGeocoder<G> {
    inner: G,
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl<G> ThrottledGeocoder<G> {
    /// Space lookups through `inner` by `interval`.
    pub fn new(inner: G, interval: Duration) -> Self {
        Self {
            inner,
            interval,
            last_request: Mutex::new(None),
        }
    }

    /// Unwrap the inner geocoder.
    pub fn into_inner(self) -> G {
        self.inner
    }
}

impl<G: Geocoder> Geocoder for ThrottledGeocoder<G> {
    fn geocode(&self, location: &str) -> Result<Coord<f64>, RouteProviderError> {
        let mut last_request = self
            .last_request
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                thread::sleep(self.interval - elapsed);
            }
        }
        let result = self.inner.geocode(location);
        *last_request = Some(Instant::now());
        result
    }
}
