//! Read-only access to fuel stations and radius searches over them.
//!
//! The [`StationCatalog`] trait answers bounding-box queries.
//! [`find_stations_in_radius`] layers a true great-circle filter on top: the
//! rectangle is a cheap prefilter sized from the radius, and each candidate is
//! then kept only if its haversine distance from the centre is within range.

use geo::{Coord, Rect};
use rstar::{AABB, RTree};

use crate::FuelStation;
use crate::geodesic::distance_miles;

/// Approximate statute miles per degree of latitude.
pub const MILES_PER_DEGREE: f64 = 69.0;

/// Read-only access to persisted fuel stations.
///
/// The bounding box uses WGS84 coordinates (`x = longitude`,
/// `y = latitude`).
///
/// # Examples
///
/// ```rust
/// use geo::{Coord, Intersects, Rect};
/// use rust_decimal::Decimal;
/// use fuelstop_core::{FuelStation, StationCatalog};
///
/// struct VecCatalog(Vec<FuelStation>);
///
/// impl StationCatalog for VecCatalog {
///     fn stations_in_bbox(
///         &self,
///         bbox: &Rect<f64>,
///     ) -> Box<dyn Iterator<Item = FuelStation> + Send + '_> {
///         let bbox = *bbox;
///         Box::new(
///             self.0
///                 .iter()
///                 .filter(move |s| bbox.intersects(&s.location))
///                 .cloned(),
///         )
///     }
/// }
///
/// let station = FuelStation::new("1-2", "Loves", Coord { x: 0.0, y: 0.0 }, Decimal::new(310, 2));
/// let catalog = VecCatalog(vec![station.clone()]);
/// let bbox = Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 });
///
/// let found: Vec<_> = catalog.stations_in_bbox(&bbox).collect();
/// assert_eq!(found, vec![station]);
/// ```
pub trait StationCatalog {
    /// Return every station inside `bbox`.
    ///
    /// Containment includes boundary points. The rectangle is axis-aligned in
    /// lon/lat space and does not wrap the antimeridian. Implementations
    /// should yield stations in ascending `station_id` order so that ties on
    /// price resolve the same way on every run.
    fn stations_in_bbox(&self, bbox: &Rect<f64>)
    -> Box<dyn Iterator<Item = FuelStation> + Send + '_>;
}

impl<T: StationCatalog + ?Sized> StationCatalog for &T {
    fn stations_in_bbox(
        &self,
        bbox: &Rect<f64>,
    ) -> Box<dyn Iterator<Item = FuelStation> + Send + '_> {
        (**self).stations_in_bbox(bbox)
    }
}

/// In-memory R\*-tree over fuel stations.
///
/// Queries return stations sorted by `station_id`.
#[derive(Debug, Default)]
pub struct StationIndex {
    tree: RTree<FuelStation>,
}

impl StationIndex {
    /// Bulk load `stations` into a new index.
    pub fn new<I>(stations: I) -> Self
    where
        I: IntoIterator<Item = FuelStation>,
    {
        Self {
            tree: RTree::bulk_load(stations.into_iter().collect()),
        }
    }

    /// Number of indexed stations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no stations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl FromIterator<FuelStation> for StationIndex {
    fn from_iter<I: IntoIterator<Item = FuelStation>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl StationCatalog for StationIndex {
    fn stations_in_bbox(
        &self,
        bbox: &Rect<f64>,
    ) -> Box<dyn Iterator<Item = FuelStation> + Send + '_> {
        let envelope =
            AABB::from_corners([bbox.min().x, bbox.min().y], [bbox.max().x, bbox.max().y]);
        let mut stations: Vec<FuelStation> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .cloned()
            .collect();
        stations.sort_by(|a, b| a.station_id.cmp(&b.station_id));

        Box::new(stations.into_iter())
    }
}

/// Bounding box covering a circle of `radius_miles` around `center`.
///
/// Longitude degrees shrink with `cos(latitude)`, so the longitude half-width
/// grows towards the poles. When it is no longer finite (or exceeds a full
/// hemisphere) the box spans every longitude.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fuelstop_core::search_bbox;
///
/// let bbox = search_bbox(Coord { x: 0.0, y: 0.0 }, 69.0);
/// assert_eq!(bbox.min(), Coord { x: -1.0, y: -1.0 });
/// assert_eq!(bbox.max(), Coord { x: 1.0, y: 1.0 });
/// ```
#[must_use]
pub fn search_bbox(center: Coord<f64>, radius_miles: f64) -> Rect<f64> {
    let lat_delta = radius_miles / MILES_PER_DEGREE;
    let lon_delta = radius_miles / (MILES_PER_DEGREE * center.y.to_radians().cos());
    let lon_delta = if lon_delta.is_finite() && lon_delta.abs() <= 180.0 {
        lon_delta.abs()
    } else {
        180.0
    };

    Rect::new(
        Coord {
            x: center.x - lon_delta,
            y: center.y - lat_delta,
        },
        Coord {
            x: center.x + lon_delta,
            y: center.y + lat_delta,
        },
    )
}

/// Stations within `radius_miles` of `center` by great-circle distance.
///
/// An empty result is not an error. The catalog's ordering is preserved.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use rust_decimal::Decimal;
/// use fuelstop_core::catalog::StationIndex;
/// use fuelstop_core::{FuelStation, find_stations_in_radius};
///
/// let here = Coord { x: -97.0, y: 38.0 };
/// let index = StationIndex::new([FuelStation::new("1-2", "Loves", here, Decimal::new(310, 2))]);
///
/// assert_eq!(find_stations_in_radius(&index, here, 0.0).len(), 1);
/// ```
pub fn find_stations_in_radius<C>(
    catalog: &C,
    center: Coord<f64>,
    radius_miles: f64,
) -> Vec<FuelStation>
where
    C: StationCatalog + ?Sized,
{
    let bbox = search_bbox(center, radius_miles);
    catalog
        .stations_in_bbox(&bbox)
        .filter(|station| distance_miles(center, station.location) <= radius_miles)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryCatalog, station};
    use rstest::{fixture, rstest};

    const CENTER: Coord<f64> = Coord { x: -97.0, y: 38.0 };

    #[fixture]
    fn stations() -> Vec<FuelStation> {
        vec![
            station("c", -97.0, 38.0, "3.50"),
            station("a", -96.0, 38.0, "3.20"),
            station("b", -90.0, 38.0, "2.90"),
        ]
    }

    #[rstest]
    fn index_returns_stations_sorted_by_id(stations: Vec<FuelStation>) {
        let index = StationIndex::new(stations);
        let bbox = Rect::new(Coord { x: -100.0, y: 30.0 }, Coord { x: -80.0, y: 40.0 });
        let ids: Vec<_> = index
            .stations_in_bbox(&bbox)
            .map(|s| s.station_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[rstest]
    fn index_excludes_stations_outside_bbox(stations: Vec<FuelStation>) {
        let index = StationIndex::new(stations);
        let bbox = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        assert_eq!(index.stations_in_bbox(&bbox).count(), 0);
    }

    #[rstest]
    #[case(Coord { x: -1.0, y: 0.0 })]
    #[case(Coord { x: 1.0, y: 1.0 })]
    fn index_includes_bbox_boundary(#[case] location: Coord<f64>) {
        let index = StationIndex::new([station("edge", location.x, location.y, "3.00")]);
        let bbox = Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 1.0, y: 1.0 });
        assert_eq!(index.stations_in_bbox(&bbox).count(), 1);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(100.0)]
    fn station_at_center_is_always_found(#[case] radius: f64) {
        let catalog = MemoryCatalog::with_station(station("here", CENTER.x, CENTER.y, "3.00"));
        let found = find_stations_in_radius(&catalog, CENTER, radius);
        assert_eq!(found.len(), 1);
    }

    #[rstest]
    fn station_just_beyond_radius_is_excluded() {
        let far = station("far", -96.0, 38.0, "3.00");
        let exact = distance_miles(CENTER, far.location);
        let catalog = MemoryCatalog::with_station(far);

        assert_eq!(find_stations_in_radius(&catalog, CENTER, exact).len(), 1);
        assert!(find_stations_in_radius(&catalog, CENTER, exact - 1e-6).is_empty());
    }

    #[rstest]
    fn corner_of_bbox_is_pruned_by_true_distance() {
        // The box corner is ~1.41x the radius away from the centre.
        let corner = station("corner", 0.99, 0.99, "3.00");
        let catalog = MemoryCatalog::with_station(corner);
        let found = find_stations_in_radius(&catalog, Coord { x: 0.0, y: 0.0 }, 69.0);
        assert!(found.is_empty());
    }

    #[rstest]
    fn empty_catalog_yields_no_stations() {
        let catalog = MemoryCatalog::default();
        assert!(find_stations_in_radius(&catalog, CENTER, 250.0).is_empty());
    }

    #[rstest]
    #[case(90.0)]
    #[case(-90.0)]
    #[case(89.999_999)]
    fn polar_search_spans_all_longitudes(#[case] latitude: f64) {
        let bbox = search_bbox(Coord { x: 10.0, y: latitude }, 100.0);
        assert!(bbox.min().x.is_finite());
        assert!(bbox.max().x.is_finite());
        assert!((bbox.width() - 360.0).abs() < 1e-9);
    }

    #[rstest]
    fn longitude_half_width_grows_with_latitude() {
        let equator = search_bbox(Coord { x: 0.0, y: 0.0 }, 100.0);
        let north = search_bbox(Coord { x: 0.0, y: 60.0 }, 100.0);
        assert!(north.width() > equator.width());
        assert!((north.height() - equator.height()).abs() < 1e-12);
    }
}
