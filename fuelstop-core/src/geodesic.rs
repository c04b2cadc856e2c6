//! Great-circle distance helpers.
//!
//! Two Earth radii are in play. Station searches and stop placement work in
//! statute miles with a 3959 mile radius, while route geometry segments are
//! measured in metres with a 6 371 000 m radius before being converted to
//! miles. Both use the haversine formula.
//!
//! Coordinates follow the workspace convention: `x = longitude`,
//! `y = latitude`, WGS84 degrees.

use geo::Coord;

/// Earth radius used for station and stop distances.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Earth radius used when measuring route geometry segments.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Conversion factor from metres to statute miles.
pub const METERS_TO_MILES: f64 = 0.000_621_371;

/// Conversion factor from statute miles to metres.
pub const MILES_TO_METERS: f64 = 1609.34;

/// Haversine distance between `a` and `b` on a sphere of `radius`.
///
/// The result shares the unit of `radius`. The intermediate term is clamped to
/// `[0, 1]` so rounding noise near antipodal points cannot produce `NaN`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fuelstop_core::geodesic::haversine_distance;
///
/// let here = Coord { x: -87.6298, y: 41.8781 };
/// assert_eq!(haversine_distance(here, here, 3959.0), 0.0);
/// ```
#[must_use]
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>, radius: f64) -> f64 {
    let phi1 = a.y.to_radians();
    let phi2 = b.y.to_radians();
    let delta_phi = (b.y - a.y).to_radians();
    let delta_lambda = (b.x - a.x).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    radius * c
}

/// Distance in statute miles, as used by station searches.
#[must_use]
pub fn distance_miles(a: Coord<f64>, b: Coord<f64>) -> f64 {
    haversine_distance(a, b, EARTH_RADIUS_MILES)
}

/// Distance in metres, as used when accumulating route geometry.
#[must_use]
pub fn distance_meters(a: Coord<f64>, b: Coord<f64>) -> f64 {
    haversine_distance(a, b, EARTH_RADIUS_METERS)
}
