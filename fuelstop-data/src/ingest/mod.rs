//! Load fuel station prices from a truck stop CSV export.
//!
//! The export lists one row per station price with the postal address but no
//! coordinates, so each distinct city/state pair is geocoded once through a
//! [`Geocoder`]. Rows with missing fields, unusable prices or locations that
//! cannot be geocoded are skipped and counted rather than aborting the load.

use std::{
    collections::HashMap,
    io::{self, Read},
    str::FromStr,
};

use camino::{Utf8Path, Utf8PathBuf};
use csv::{ReaderBuilder, StringRecord};
use fuelstop_core::{FuelStation, Geocoder};
use geo::Coord;
use log::{debug, info, warn};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

mod columns;

use columns::{Columns, field};

/// Postal code recorded for stations; the export does not carry one.
pub const UNKNOWN_ZIP_CODE: &str = "00000";

/// Address recorded when the export leaves the column blank.
pub const UNKNOWN_ADDRESS: &str = "N/A";

/// Prices are stored in whole cents, rounded half-to-even.
pub const PRICE_DECIMALS: u32 = 2;

/// Errors that abort a station load.
#[derive(Debug, Error)]
pub enum StationIngestError {
    /// Opening the CSV file failed.
    #[error("failed to open station CSV at {path}")]
    Open {
        /// Location of the CSV file on disk.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The header row lacks a required column.
    #[error("station CSV is missing column {column:?}")]
    MissingColumn {
        /// Name of the missing column.
        column: &'static str,
    },
    /// Reading the CSV stream failed.
    #[error("failed to read station CSV")]
    Read {
        /// Source error produced by the `csv` reader.
        #[source]
        source: csv::Error,
    },
}

/// Stations parsed from a CSV export together with skip counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationLoad {
    /// Stations ready to persist, in file order.
    pub stations: Vec<FuelStation>,
    /// Rows skipped for missing fields, malformed records or bad prices.
    pub skipped_invalid: usize,
    /// Rows skipped because their city/state could not be geocoded.
    pub skipped_unlocated: usize,
    /// Number of geocoder lookups issued.
    pub geocode_requests: usize,
}

impl StationLoad {
    /// Total rows skipped for any reason.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped_invalid + self.skipped_unlocated
    }
}

/// Open `path` and parse it with [`load_stations_csv`].
///
/// # Errors
///
/// Returns [`StationIngestError::Open`] when the file cannot be opened and
/// otherwise whatever [`load_stations_csv`] reports.
pub fn load_stations_csv_file<G>(
    path: &Utf8Path,
    geocoder: &G,
    limit: Option<usize>,
) -> Result<StationLoad, StationIngestError>
where
    G: Geocoder + ?Sized,
{
    let file = fuelstop_fs::open_utf8_file(path).map_err(|source| StationIngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    info!("loading stations from {path}");
    load_stations_csv(file, geocoder, limit)
}

/// Parse station rows from `reader`, geocoding each city/state pair once.
///
/// Stations are identified as `{OPIS id}-{row}` where `row` counts data rows
/// from one, so repeated ids in the export stay distinct. When `limit` is set
/// parsing stops once that many stations have been produced. Optional
/// `Latitude`/`Longitude` columns bypass the geocoder for rows that fill them.
///
/// # Errors
///
/// Returns [`StationIngestError::MissingColumn`] when the header row lacks a
/// required column and [`StationIngestError::Read`] when the underlying
/// reader fails. Malformed rows are skipped, not reported as errors.
pub fn load_stations_csv<R, G>(
    reader: R,
    geocoder: &G,
    limit: Option<usize>,
) -> Result<StationLoad, StationIngestError>
where
    R: Read,
    G: Geocoder + ?Sized,
{
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader
        .headers()
        .map_err(|source| StationIngestError::Read { source })?
        .clone();
    let columns = Columns::from_headers(&headers)?;

    let mut locations = LocationCache::new(geocoder);
    let mut load = StationLoad::default();

    for (index, record) in reader.records().enumerate() {
        if limit.is_some_and(|max| load.stations.len() >= max) {
            break;
        }
        let row_number = index + 1;
        let record = match record {
            Ok(record) => record,
            Err(source) if source.is_io_error() => {
                return Err(StationIngestError::Read { source });
            }
            Err(err) => {
                warn!("skipping malformed row {row_number}: {err}");
                load.skipped_invalid += 1;
                continue;
            }
        };

        let Some(row) = StationRow::parse(&record, &columns) else {
            debug!("skipping incomplete row {row_number}");
            load.skipped_invalid += 1;
            continue;
        };

        let location = match row.coordinates {
            Some(location) => Some(location),
            None => locations.resolve(row.city, row.state),
        };
        let Some(location) = location else {
            load.skipped_unlocated += 1;
            continue;
        };

        load.stations.push(row.into_station(row_number, location));
        if load.stations.len() % 50 == 0 {
            info!("loaded {} stations", load.stations.len());
        }
    }

    load.geocode_requests = locations.requests;
    info!(
        "loaded {} stations, skipped {} ({} unlocated)",
        load.stations.len(),
        load.skipped(),
        load.skipped_unlocated
    );
    Ok(load)
}

/// Required fields of one export row, borrowed from the record.
struct StationRow<'a> {
    id: &'a str,
    name: &'a str,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    price: Decimal,
    coordinates: Option<Coord<f64>>,
}

impl<'a> StationRow<'a> {
    fn parse(record: &'a StringRecord, columns: &Columns) -> Option<Self> {
        let id = field(record, columns.id);
        let name = field(record, columns.name);
        let city = field(record, columns.city);
        let state = field(record, columns.state);
        let price_text = field(record, columns.price);
        if [id, name, city, state, price_text].iter().any(|value| value.is_empty()) {
            return None;
        }

        let price = Decimal::from_str(price_text)
            .ok()?
            .round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointNearestEven);
        if price <= Decimal::ZERO {
            return None;
        }

        let coordinates = columns.coordinates.and_then(|(lat, lon)| {
            let y = field(record, lat).parse::<f64>().ok()?;
            let x = field(record, lon).parse::<f64>().ok()?;
            (y.is_finite() && x.is_finite()).then_some(Coord { x, y })
        });

        Some(Self {
            id,
            name,
            address: field(record, columns.address),
            city,
            state,
            price,
            coordinates,
        })
    }

    fn into_station(self, row_number: usize, location: Coord<f64>) -> FuelStation {
        let address = if self.address.is_empty() {
            UNKNOWN_ADDRESS
        } else {
            self.address
        };
        FuelStation::new(
            format!("{}-{row_number}", self.id),
            self.name,
            location,
            self.price,
        )
        .with_address(address)
        .with_city_state(self.city, self.state)
        .with_zip_code(UNKNOWN_ZIP_CODE)
    }
}

/// Memoises geocoder results per city/state pair, failures included.
struct LocationCache<'g, G: ?Sized> {
    geocoder: &'g G,
    resolved: HashMap<(String, String), Option<Coord<f64>>>,
    requests: usize,
}

impl<'g, G: Geocoder + ?Sized> LocationCache<'g, G> {
    fn new(geocoder: &'g G) -> Self {
        Self {
            geocoder,
            resolved: HashMap::new(),
            requests: 0,
        }
    }

    fn resolve(&mut self, city: &str, state: &str) -> Option<Coord<f64>> {
        let key = (city.to_owned(), state.to_owned());
        if let Some(location) = self.resolved.get(&key) {
            return *location;
        }

        self.requests += 1;
        let query = format!("{city}, {state}, USA");
        debug!("geocoding {query}");
        let location = match self.geocoder.geocode(&query) {
            Ok(location) => Some(location),
            Err(err) => {
                warn!("could not geocode {city}, {state}: {err}");
                None
            }
        };
        self.resolved.insert(key, location);
        location
    }
}
