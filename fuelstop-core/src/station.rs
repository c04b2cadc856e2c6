use geo::Coord;
use rstar::{AABB, RTreeObject};
use rust_decimal::Decimal;

/// A retail fuel station.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`. Prices are
/// per US gallon and carry two decimal places.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use rust_decimal::Decimal;
/// use fuelstop_core::FuelStation;
///
/// let station = FuelStation::new(
///     "7-2",
///     "Pilot Travel Center",
///     Coord { x: -87.6, y: 41.9 },
///     Decimal::new(329, 2),
/// );
///
/// assert_eq!(station.station_id, "7-2");
/// assert_eq!(station.price_per_gallon.to_string(), "3.29");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuelStation {
    pub station_id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub location: Coord<f64>,
    pub price_per_gallon: Decimal,
}

impl FuelStation {
    /// Construct a station with empty postal details.
    ///
    /// Use struct update syntax or the `with_*` builders to fill in the
    /// address.
    pub fn new(
        station_id: impl Into<String>,
        name: impl Into<String>,
        location: Coord<f64>,
        price_per_gallon: Decimal,
    ) -> Self {
        Self {
            station_id: station_id.into(),
            name: name.into(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            location,
            price_per_gallon,
        }
    }

    /// Attach a street address.
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Attach the city and two-letter state code.
    #[must_use]
    pub fn with_city_state(mut self, city: impl Into<String>, state: impl Into<String>) -> Self {
        self.city = city.into();
        self.state = state.into();
        self
    }

    /// Attach a postal code.
    #[must_use]
    pub fn with_zip_code(mut self, zip_code: impl Into<String>) -> Self {
        self.zip_code = zip_code.into();
        self
    }
}

impl RTreeObject for FuelStation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.location.x, self.location.y])
    }
}
