//! Test-only, in-memory `StationCatalog` and route builders used by unit and
//! behaviour tests.

use std::str::FromStr;
use std::time::Duration;

use geo::{Coord, Intersects, Rect};
use rust_decimal::Decimal;

use crate::geodesic::distance_meters;
use crate::{FuelStation, RouteGeometry, StationCatalog};

/// In-memory `StationCatalog` implementation used in tests.
///
/// The catalog performs a linear scan and is intended only for small datasets.
/// Stations are kept sorted by `station_id`.
#[derive(Default, Debug, Clone)]
pub struct MemoryCatalog {
    stations: Vec<FuelStation>,
}

impl MemoryCatalog {
    /// Create a catalog containing a single station.
    pub fn with_station(station: FuelStation) -> Self {
        Self::with_stations(std::iter::once(station))
    }

    /// Create a catalog from a collection of stations.
    pub fn with_stations<I>(stations: I) -> Self
    where
        I: IntoIterator<Item = FuelStation>,
    {
        let mut stations: Vec<_> = stations.into_iter().collect();
        stations.sort_by(|a, b| a.station_id.cmp(&b.station_id));
        Self { stations }
    }

    /// Add a station, keeping the catalog ordered.
    pub fn push(&mut self, station: FuelStation) {
        let position = self
            .stations
            .partition_point(|existing| existing.station_id <= station.station_id);
        self.stations.insert(position, station);
    }

    /// Number of stations held.
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

impl StationCatalog for MemoryCatalog {
    fn stations_in_bbox(
        &self,
        bbox: &Rect<f64>,
    ) -> Box<dyn Iterator<Item = FuelStation> + Send + '_> {
        let bbox = *bbox;
        Box::new(
            self.stations
                .iter()
                // `Intersects` treats boundary points as inside the rectangle.
                .filter(move |s| bbox.intersects(&s.location))
                .cloned(),
        )
    }
}

/// Build a station at `(lon, lat)` priced from a decimal literal.
///
/// # Panics
///
/// Panics when `price` is not a decimal number.
pub fn station(id: &str, lon: f64, lat: f64, price: &str) -> FuelStation {
    let price = Decimal::from_str(price).expect("valid decimal price literal");
    FuelStation::new(id, format!("Station {id}"), Coord { x: lon, y: lat }, price)
}

/// Build a route along the equator from longitude `0` eastwards.
///
/// Points are spaced `step_degrees` apart and the reported distance is the
/// summed haversine length of the polyline. One degree of longitude on the
/// equator is roughly 69.1 miles.
///
/// # Panics
///
/// Panics when fewer than two points are requested.
pub fn equator_route(points: usize, step_degrees: f64) -> RouteGeometry {
    let coordinates: Vec<Coord<f64>> = (0..points)
        .map(|i| Coord {
            x: index_as_f64(i) * step_degrees,
            y: 0.0,
        })
        .collect();
    let distance: f64 = coordinates
        .windows(2)
        .map(|pair| distance_meters(pair[0], pair[1]))
        .sum();
    RouteGeometry::new(coordinates, distance, Duration::from_secs_f64(distance / 25.0))
        .expect("equator route needs at least two points")
}

/// Longitude on the equator that lies `miles` east of longitude `0`.
pub fn equator_longitude_at(miles: f64) -> f64 {
    miles / (crate::geodesic::EARTH_RADIUS_MILES * std::f64::consts::PI / 180.0)
}

fn index_as_f64(index: usize) -> f64 {
    index as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesic::distance_miles;
    use rstest::rstest;

    #[rstest]
    fn push_keeps_stations_ordered() {
        let mut catalog = MemoryCatalog::with_stations([station("b", 0.0, 0.0, "3.00")]);
        catalog.push(station("a", 0.0, 0.0, "3.00"));
        catalog.push(station("c", 0.0, 0.0, "3.00"));
        let bbox = Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 });
        let ids: Vec<_> = catalog
            .stations_in_bbox(&bbox)
            .map(|s| s.station_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[rstest]
    fn equator_longitude_matches_haversine() {
        let lon = equator_longitude_at(120.0);
        let miles = distance_miles(Coord { x: 0.0, y: 0.0 }, Coord { x: lon, y: 0.0 });
        assert!((miles - 120.0).abs() < 1e-6);
    }
}
