//! SQLite persistence for ingested fuel stations.

use camino::{Utf8Path, Utf8PathBuf};
use fuelstop_core::FuelStation;
use rusqlite::{Connection, Error as SqliteError, Transaction};
use thiserror::Error;

/// Errors raised when persisting stations to SQLite.
#[derive(Debug, Error)]
pub enum PersistStationsError {
    /// Failed to create the parent directory for the database.
    #[error("failed to create parent directory for {path:?}")]
    CreateDirectory {
        /// Database path whose parent could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Destination database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Beginning the transaction failed.
    #[error("failed to begin station persistence transaction")]
    BeginTransaction {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Creating the `stations` table or its indices failed.
    #[error("failed to create stations schema")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Clearing previously loaded stations failed.
    #[error("failed to clear existing stations")]
    ClearStations {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Preparing the insert statement failed.
    #[error("failed to prepare station insert statement")]
    PrepareInsert {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Writing a station row failed.
    #[error("failed to persist station {station_id}")]
    PersistRow {
        /// Identifier of the station being persisted.
        station_id: String,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// Committing the transaction failed.
    #[error("failed to commit station persistence transaction")]
    Commit {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

/// Schema for the `stations` table and its lookup indices.
pub(crate) const STATIONS_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS stations (
        station_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        address TEXT NOT NULL,
        city TEXT NOT NULL,
        state TEXT NOT NULL,
        zip_code TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        price_per_gallon TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS stations_location ON stations (latitude, longitude);
    CREATE INDEX IF NOT EXISTS stations_price ON stations (price_per_gallon);
";

/// Replace the station catalogue stored at `path` with `stations`.
///
/// Parent directories are created automatically and the `stations` table is
/// initialised if missing. Existing rows are removed first, so the database
/// always mirrors the most recent load. Prices are stored as decimal text to
/// keep cents exact.
///
/// # Errors
///
/// Returns [`PersistStationsError`] naming the step that failed. Nothing is
/// written unless every row succeeds.
pub fn persist_stations_to_sqlite(
    path: &Utf8Path,
    stations: &[FuelStation],
) -> Result<(), PersistStationsError> {
    fuelstop_fs::ensure_parent_dir(path).map_err(|source| {
        PersistStationsError::CreateDirectory {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let mut connection =
        Connection::open(path.as_std_path()).map_err(|source| PersistStationsError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let transaction = connection
        .transaction()
        .map_err(|source| PersistStationsError::BeginTransaction { source })?;

    transaction
        .execute_batch(STATIONS_SCHEMA)
        .map_err(|source| PersistStationsError::CreateSchema { source })?;
    transaction
        .execute("DELETE FROM stations", [])
        .map_err(|source| PersistStationsError::ClearStations { source })?;
    persist_rows(&transaction, stations)?;

    transaction
        .commit()
        .map_err(|source| PersistStationsError::Commit { source })?;
    log::info!("persisted {} stations to {path}", stations.len());
    Ok(())
}

fn persist_rows(
    transaction: &Transaction<'_>,
    stations: &[FuelStation],
) -> Result<(), PersistStationsError> {
    if stations.is_empty() {
        return Ok(());
    }

    let mut statement = transaction
        .prepare(
            "INSERT OR REPLACE INTO stations (
                station_id, name, address, city, state, zip_code,
                latitude, longitude, price_per_gallon
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .map_err(|source| PersistStationsError::PrepareInsert { source })?;

    for station in stations {
        statement
            .execute((
                &station.station_id,
                &station.name,
                &station.address,
                &station.city,
                &station.state,
                &station.zip_code,
                station.location.y,
                station.location.x,
                station.price_per_gallon.to_string(),
            ))
            .map_err(|source| PersistStationsError::PersistRow {
                station_id: station.station_id.clone(),
                source,
            })?;
    }

    Ok(())
}
