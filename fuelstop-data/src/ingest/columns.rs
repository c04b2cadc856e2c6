//! Header lookup for the truck stop price export.

use csv::StringRecord;

use super::StationIngestError;

pub(super) const ID: &str = "OPIS Truckstop ID";
pub(super) const NAME: &str = "Truckstop Name";
pub(super) const ADDRESS: &str = "Address";
pub(super) const CITY: &str = "City";
pub(super) const STATE: &str = "State";
pub(super) const PRICE: &str = "Retail Price";
pub(super) const LATITUDE: &str = "Latitude";
pub(super) const LONGITUDE: &str = "Longitude";

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
pub(super) struct Columns {
    pub id: usize,
    pub name: usize,
    pub address: usize,
    pub city: usize,
    pub state: usize,
    pub price: usize,
    pub coordinates: Option<(usize, usize)>,
}

impl Columns {
    pub fn from_headers(headers: &StringRecord) -> Result<Self, StationIngestError> {
        let required = |column: &'static str| {
            position(headers, column).ok_or(StationIngestError::MissingColumn { column })
        };
        let coordinates = position(headers, LATITUDE).zip(position(headers, LONGITUDE));

        Ok(Self {
            id: required(ID)?,
            name: required(NAME)?,
            address: required(ADDRESS)?,
            city: required(CITY)?,
            state: required(STATE)?,
            price: required(PRICE)?,
            coordinates,
        })
    }
}

fn position(headers: &StringRecord, column: &str) -> Option<usize> {
    headers.iter().position(|header| header.trim() == column)
}

/// Field `index` of `record`, trimmed, or empty when the row is short.
pub(super) fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).map_or("", str::trim)
}
