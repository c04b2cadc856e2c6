//! Station catalogues backed by persisted artefacts.

mod sqlite;

pub use sqlite::{SqliteStationCatalog, SqliteStationCatalogError};
