//! Route geometry returned by routing backends and the waypoints sampled from
//! it.

use std::time::Duration;

use geo::Coord;

use crate::PlanError;
use crate::geodesic::METERS_TO_MILES;

/// A driving route between two resolved locations.
///
/// The geometry is an ordered polyline with `x = longitude` and
/// `y = latitude`. Distance and duration are kept in the units the routing
/// backend reports (metres and seconds); use [`RouteGeometry::distance_miles`]
/// and [`RouteGeometry::duration_hours`] for planning.
///
/// `start` and `finish` are the resolved trip endpoints. They default to the
/// ends of the polyline; routing backends that snap to the road network
/// attach the geocoded points with [`RouteGeometry::with_endpoints`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use geo::Coord;
/// use fuelstop_core::RouteGeometry;
///
/// let route = RouteGeometry::new(
///     vec![Coord { x: -87.6, y: 41.9 }, Coord { x: -90.2, y: 38.6 }],
///     480_000.0,
///     Duration::from_secs(16_200),
/// )?;
/// assert!((route.distance_miles() - 298.26).abs() < 0.01);
/// assert_eq!(route.duration_hours(), 4.5);
/// # Ok::<(), fuelstop_core::PlanError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawRouteGeometry"))]
pub struct RouteGeometry {
    coordinates: Vec<Coord<f64>>,
    distance_meters: f64,
    duration: Duration,
    start: Coord<f64>,
    finish: Coord<f64>,
}

/// Unchecked wire form; deserialized routes pass through [`RouteGeometry::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawRouteGeometry {
    coordinates: Vec<Coord<f64>>,
    distance_meters: f64,
    duration: Duration,
    #[serde(default)]
    start: Option<Coord<f64>>,
    #[serde(default)]
    finish: Option<Coord<f64>>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawRouteGeometry> for RouteGeometry {
    type Error = PlanError;

    fn try_from(raw: RawRouteGeometry) -> Result<Self, Self::Error> {
        let route = Self::new(raw.coordinates, raw.distance_meters, raw.duration)?;
        let start = raw.start.unwrap_or(route.start);
        let finish = raw.finish.unwrap_or(route.finish);
        Ok(route.with_endpoints(start, finish))
    }
}

impl RouteGeometry {
    /// Validate and construct a route.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidRoute`] when fewer than two coordinates are
    /// supplied or the distance is not a positive, finite number.
    pub fn new(
        coordinates: Vec<Coord<f64>>,
        distance_meters: f64,
        duration: Duration,
    ) -> Result<Self, PlanError> {
        let (start, finish) = match coordinates.as_slice() {
            [first, .., last] => (*first, *last),
            _ => {
                return Err(PlanError::InvalidRoute {
                    reason: format!(
                        "geometry needs at least two points, found {}",
                        coordinates.len()
                    ),
                });
            }
        };
        if !(distance_meters.is_finite() && distance_meters > 0.0) {
            return Err(PlanError::InvalidRoute {
                reason: format!("route distance must be positive, found {distance_meters}"),
            });
        }
        Ok(Self {
            coordinates,
            distance_meters,
            duration,
            start,
            finish,
        })
    }

    /// Replace the trip endpoints with the resolved start and finish locations.
    #[must_use]
    pub const fn with_endpoints(mut self, start: Coord<f64>, finish: Coord<f64>) -> Self {
        self.start = start;
        self.finish = finish;
        self
    }

    /// Ordered route polyline.
    #[must_use]
    pub fn coordinates(&self) -> &[Coord<f64>] {
        &self.coordinates
    }

    /// Resolved start location.
    #[must_use]
    pub const fn start(&self) -> Coord<f64> {
        self.start
    }

    /// Resolved finish location.
    #[must_use]
    pub const fn finish(&self) -> Coord<f64> {
        self.finish
    }

    /// Total route distance in metres.
    #[must_use]
    pub const fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    /// Total route distance in statute miles.
    #[must_use]
    pub fn distance_miles(&self) -> f64 {
        self.distance_meters * METERS_TO_MILES
    }

    /// Expected driving time.
    #[must_use]
    pub const fn duration(&self) -> Duration {
        self.duration
    }

    /// Expected driving time in hours.
    #[must_use]
    pub fn duration_hours(&self) -> f64 {
        self.duration.as_secs_f64() / 3600.0
    }
}

/// A sampled point along a route tagged with its cumulative mileage.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    /// Position on the route (`x = longitude`, `y = latitude`).
    pub location: Coord<f64>,
    /// Miles driven from the route start to this point.
    pub cumulative_miles: f64,
}

impl Waypoint {
    /// Construct a waypoint.
    #[must_use]
    pub const fn new(location: Coord<f64>, cumulative_miles: f64) -> Self {
        Self {
            location,
            cumulative_miles,
        }
    }
}
