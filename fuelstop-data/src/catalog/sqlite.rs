//! SQLite-backed station catalogue.

use std::{fmt, str::FromStr};

use camino::{Utf8Path, Utf8PathBuf};
use fuelstop_core::{FuelStation, StationCatalog, StationIndex};
use geo::{Coord, Rect};
use rusqlite::{Connection, OpenFlags, Row};
use rust_decimal::Decimal;
use thiserror::Error;

/// Error raised when reading persisted stations.
#[derive(Debug, Error)]
pub enum SqliteStationCatalogError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored price was not a decimal number.
    #[error("station {station_id} has an invalid price {value:?}")]
    InvalidPrice {
        /// Identifier of the offending station.
        station_id: String,
        /// Text found in the `price_per_gallon` column.
        value: String,
    },
    /// Generic SQLite error when reading station rows.
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

/// Read-only station catalogue loaded from the `stations` table.
///
/// Rows are read once on open and held in an R\*-tree, so lookups never touch
/// the database.
pub struct SqliteStationCatalog {
    index: StationIndex,
}

impl fmt::Debug for SqliteStationCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStationCatalog")
            .field("stations", &self.index.len())
            .finish_non_exhaustive()
    }
}

impl SqliteStationCatalog {
    /// Open the catalogue stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStationCatalogError::OpenDatabase`] when the file
    /// cannot be opened, [`SqliteStationCatalogError::InvalidPrice`] when a
    /// price does not parse and [`SqliteStationCatalogError::Database`] for
    /// any other read failure, including a missing `stations` table.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteStationCatalogError> {
        let connection =
            Connection::open_with_flags(path.as_std_path(), OpenFlags::SQLITE_OPEN_READ_ONLY)
                .map_err(|source| SqliteStationCatalogError::OpenDatabase {
                    path: path.to_path_buf(),
                    source,
                })?;

        let stations = load_stations(&connection)?;
        log::debug!("loaded {} stations from {path}", stations.len());
        Ok(Self {
            index: StationIndex::new(stations),
        })
    }

    /// Number of stations in the catalogue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the catalogue holds no stations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl StationCatalog for SqliteStationCatalog {
    fn stations_in_bbox(
        &self,
        bbox: &Rect<f64>,
    ) -> Box<dyn Iterator<Item = FuelStation> + Send + '_> {
        self.index.stations_in_bbox(bbox)
    }
}

fn load_stations(connection: &Connection) -> Result<Vec<FuelStation>, SqliteStationCatalogError> {
    let mut statement = connection.prepare(
        "SELECT station_id, name, address, city, state, zip_code,
                latitude, longitude, price_per_gallon
         FROM stations",
    )?;
    let mut rows = statement.query([])?;
    let mut stations = Vec::new();

    while let Some(row) = rows.next()? {
        stations.push(station_from_row(row)?);
    }

    Ok(stations)
}

fn station_from_row(row: &Row<'_>) -> Result<FuelStation, SqliteStationCatalogError> {
    let station_id: String = row.get(0)?;
    let latitude: f64 = row.get(6)?;
    let longitude: f64 = row.get(7)?;
    let price_text: String = row.get(8)?;
    let price = Decimal::from_str(price_text.trim()).map_err(|_| {
        SqliteStationCatalogError::InvalidPrice {
            station_id: station_id.clone(),
            value: price_text.clone(),
        }
    })?;

    Ok(FuelStation {
        station_id,
        name: row.get(1)?,
        address: row.get(2)?,
        city: row.get(3)?,
        state: row.get(4)?,
        zip_code: row.get(5)?,
        location: Coord {
            x: longitude,
            y: latitude,
        },
        price_per_gallon: price,
    })
}
