//! Nominatim search response types.
//!
//! Nominatim returns coordinates as decimal strings, so they are parsed after
//! decoding.
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>

use geo::Coord;
use serde::Deserialize;

/// One match from the `/search` endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    /// Latitude as a decimal string.
    pub lat: String,
    /// Longitude as a decimal string.
    pub lon: String,
    /// Human-readable name of the match.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl SearchHit {
    /// Parse the hit's position, `None` when either component is malformed.
    #[must_use]
    pub fn coordinate(&self) -> Option<Coord<f64>> {
        let y = self.lat.trim().parse::<f64>().ok()?;
        let x = self.lon.trim().parse::<f64>().ok()?;
        (x.is_finite() && y.is_finite()).then_some(Coord { x, y })
    }
}
