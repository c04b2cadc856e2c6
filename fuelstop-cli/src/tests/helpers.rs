//! Test doubles and fixtures shared by the CLI command tests.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use fuelstop_core::geodesic::distance_meters;
use fuelstop_core::{FuelStation, Geocoder, RouteGeometry, RouteProviderError, StationIndex};
use fuelstop_data::routing::test_support::{StubGeocoder, StubRouteProvider};
use geo::Coord;
use std::time::Duration;
use tempfile::TempDir;

use crate::CliError;
use crate::load::{LoadStationsConfig, StationGeocoderBuilder};
use crate::trip::{TripConfig, TripServices, TripServicesBuilder};

/// Identifier of the station the corridor plan is expected to choose.
pub(super) const CHEAPEST_STATION: &str = "cheap-1";

pub(super) fn utf8_tempdir() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    fs::write(path.as_std_path(), contents).expect("write fixture file");
}

/// Roughly 829 miles along the equator, sampled every tenth of a degree.
pub(super) fn corridor_route() -> RouteGeometry {
    let coordinates: Vec<Coord<f64>> = (0..=120_u32)
        .map(|step| Coord {
            x: f64::from(step) / 10.0,
            y: 0.0,
        })
        .collect();
    let distance: f64 = coordinates
        .windows(2)
        .map(|pair| distance_meters(pair[0], pair[1]))
        .sum();
    RouteGeometry::new(coordinates, distance, Duration::from_secs(13 * 3600))
        .expect("corridor route")
}

fn station(id: &str, lon: f64, price: &str) -> FuelStation {
    FuelStation::new(
        id,
        format!("Station {id}"),
        Coord { x: lon, y: 0.05 },
        price.parse().expect("decimal price"),
    )
    .with_city_state("Testville", "TX")
}

/// Stations around the corridor; only the first two lie near mile 450.
pub(super) fn corridor_stations() -> Vec<FuelStation> {
    vec![
        station(CHEAPEST_STATION, 6.5, "3.10"),
        station("dear-2", 6.6, "3.90"),
        station("early-3", 2.0, "2.00"),
    ]
}

/// Serves a fixed route and station set regardless of configuration.
pub(super) struct StubTripServicesBuilder {
    routes: StubRouteProvider,
    stations: Vec<FuelStation>,
}

impl StubTripServicesBuilder {
    pub(super) fn corridor() -> Self {
        Self {
            routes: StubRouteProvider::with_route(corridor_route()),
            stations: corridor_stations(),
        }
    }

    pub(super) fn failing(error: RouteProviderError) -> Self {
        Self {
            routes: StubRouteProvider::with_error(error),
            stations: corridor_stations(),
        }
    }
}

impl TripServicesBuilder for StubTripServicesBuilder {
    fn build(&self, _config: &TripConfig) -> Result<TripServices, CliError> {
        Ok(TripServices {
            routes: Box::new(self.routes.clone()),
            catalog: Box::new(StationIndex::new(self.stations.clone())),
        })
    }
}

/// Hands out a clone of a prepared [`StubGeocoder`].
pub(super) struct StubGeocoderBuilder {
    pub(super) geocoder: StubGeocoder,
}

impl StubGeocoderBuilder {
    pub(super) fn oklahoma_and_wisconsin() -> Self {
        Self {
            geocoder: StubGeocoder::new()
                .with_location("Big Cabin, OK, USA", Coord { x: -95.22, y: 36.54 })
                .with_location("Tomah, WI, USA", Coord { x: -90.50, y: 43.98 }),
        }
    }
}

impl StationGeocoderBuilder for StubGeocoderBuilder {
    fn build(&self, _config: &LoadStationsConfig) -> Result<Box<dyn Geocoder>, CliError> {
        Ok(Box::new(self.geocoder.clone()))
    }
}

pub(super) const PRICE_EXPORT: &str = "\
OPIS Truckstop ID,Truckstop Name,Address,City,State,Rack ID,Retail Price
7,WOODSHED OF BIG CABIN,\"I-44, EXIT 283\",Big Cabin,OK,307,3.20
8,BIG CABIN TRAVEL CENTER,\"I-44, EXIT 283\",Big Cabin,OK,307,3.10
9,TOMAH TRUCK PLAZA,I-94 EXIT 143,Tomah,WI,55,3.40
1,LOST STOP,NOWHERE RD,Atlantis,ZZ,1,3.00
";
