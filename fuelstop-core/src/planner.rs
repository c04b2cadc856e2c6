//! Greedy selection of refuelling stops along a sampled route.
//!
//! The planner walks the route in range-sized hops. Each hop targets a point
//! one safety margin short of the vehicle's range, finds the waypoint nearest
//! that mileage and buys a full tank at the cheapest station within the search
//! radius of it. Widening radii and a midpoint fallback cover sparse stretches
//! of the station catalog. The choice is local: earlier stops are never
//! revisited.

use geo::Coord;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::geodesic::distance_miles;
use crate::{
    DEFAULT_WAYPOINT_INTERVAL_MILES, FuelStation, PlanError, RouteGeometry, StationCatalog,
    Waypoint, find_stations_in_radius, sample_waypoints,
};

/// Vehicle and search parameters used by [`FuelPlanner`].
///
/// # Examples
/// ```
/// use fuelstop_core::PlannerConfig;
///
/// let config = PlannerConfig::default();
/// assert_eq!(config.tank_capacity_gallons(), 50.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlannerConfig {
    /// Miles the vehicle covers on a full tank.
    pub max_range_miles: f64,
    /// Fuel economy in miles per gallon.
    pub mpg: f64,
    /// Radius of the first station search around each target.
    pub search_radius_miles: f64,
    /// Distance held back from the full range when choosing a target.
    pub safety_margin_miles: f64,
    /// Radii tried in order when the first search finds nothing.
    pub fallback_radii_miles: Vec<f64>,
    /// Spacing used when sampling route waypoints.
    pub waypoint_interval_miles: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_range_miles: 500.0,
            mpg: 10.0,
            search_radius_miles: 100.0,
            safety_margin_miles: 50.0,
            fallback_radii_miles: vec![150.0, 200.0, 250.0],
            waypoint_interval_miles: DEFAULT_WAYPOINT_INTERVAL_MILES,
        }
    }
}

impl PlannerConfig {
    /// Gallons bought at every stop.
    #[must_use]
    pub fn tank_capacity_gallons(&self) -> f64 {
        self.max_range_miles / self.mpg
    }

    /// Radius used by the midpoint fallback search.
    #[must_use]
    pub fn midpoint_radius_miles(&self) -> f64 {
        self.search_radius_miles * 2.0
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidConfig`] naming the first bad parameter.
    pub fn validate(&self) -> Result<(), PlanError> {
        let positive = [
            ("max_range_miles", self.max_range_miles),
            ("mpg", self.mpg),
            ("search_radius_miles", self.search_radius_miles),
            ("waypoint_interval_miles", self.waypoint_interval_miles),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PlanError::InvalidConfig {
                    reason: format!("{name} must be a positive number, found {value}"),
                });
            }
        }
        if !(self.safety_margin_miles.is_finite()
            && (0.0..self.max_range_miles).contains(&self.safety_margin_miles))
        {
            return Err(PlanError::InvalidConfig {
                reason: format!(
                    "safety_margin_miles must lie in [0, {}), found {}",
                    self.max_range_miles, self.safety_margin_miles
                ),
            });
        }
        if let Some(radius) = self
            .fallback_radii_miles
            .iter()
            .find(|radius| !(radius.is_finite() && **radius > 0.0))
        {
            return Err(PlanError::InvalidConfig {
                reason: format!("fallback radii must be positive, found {radius}"),
            });
        }
        Ok(())
    }
}

/// A planned refuelling stop.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuelStop {
    /// 1-based position of the stop in the plan.
    pub stop_number: u32,
    /// Station chosen for the stop.
    pub station: FuelStation,
    /// Route mileage of the waypoint nearest to the station.
    pub distance_from_start_miles: f64,
    /// Gallons bought; always a full tank.
    pub fuel_amount_gallons: f64,
    /// Price of the fuel bought, rounded to cents.
    pub cost: Decimal,
}

/// Stops chosen for a route together with the waypoints they were placed on.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FuelPlan {
    /// Stops in driving order.
    pub stops: Vec<FuelStop>,
    /// Waypoints sampled from the route.
    pub waypoints: Vec<Waypoint>,
}

/// Progress carried from one planning hop to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LegState {
    current_distance: f64,
    fuel_range_remaining: f64,
    stop_number: u32,
}

impl LegState {
    const fn start(max_range_miles: f64) -> Self {
        Self {
            current_distance: 0.0,
            fuel_range_remaining: max_range_miles,
            stop_number: 1,
        }
    }

    const fn refuelled_at(self, distance: f64, max_range_miles: f64) -> Self {
        Self {
            current_distance: distance,
            fuel_range_remaining: max_range_miles,
            stop_number: self.stop_number + 1,
        }
    }

    fn needs_fuel(&self, total_distance_miles: f64) -> bool {
        self.current_distance + self.fuel_range_remaining < total_distance_miles
    }
}

/// Greedy fuel-stop planner over a [`StationCatalog`].
///
/// The planner holds no per-request state; one instance can serve any number
/// of routes.
///
/// # Examples
/// ```
/// use fuelstop_core::catalog::StationIndex;
/// use fuelstop_core::{FuelPlanner, RouteGeometry};
/// use geo::Coord;
/// use std::time::Duration;
///
/// let planner = FuelPlanner::new(StationIndex::default());
/// let route = RouteGeometry::new(
///     vec![Coord { x: -87.6, y: 41.9 }, Coord { x: -90.2, y: 38.6 }],
///     480_000.0,
///     Duration::from_secs(16_200),
/// )?;
///
/// // Under 500 miles: the starting tank is enough.
/// let plan = planner.plan(&route)?;
/// assert!(plan.stops.is_empty());
/// # Ok::<(), fuelstop_core::PlanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FuelPlanner<C> {
    catalog: C,
    config: PlannerConfig,
}

impl<C: StationCatalog> FuelPlanner<C> {
    /// Create a planner with the default vehicle parameters.
    pub fn new(catalog: C) -> Self {
        Self::with_config(catalog, PlannerConfig::default())
    }

    /// Create a planner with custom parameters.
    pub fn with_config(catalog: C, config: PlannerConfig) -> Self {
        Self { catalog, config }
    }

    /// Parameters in use.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Catalog queried for stations.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Sample `route` into waypoints and plan stops along it.
    ///
    /// # Errors
    ///
    /// Propagates [`PlanError`] from waypoint sampling and
    /// [`FuelPlanner::calculate_optimal_stops`].
    pub fn plan(&self, route: &RouteGeometry) -> Result<FuelPlan, PlanError> {
        self.config.validate()?;
        let waypoints = sample_waypoints(
            route.coordinates(),
            route.distance_meters(),
            self.config.waypoint_interval_miles,
        )?;
        let stops = self.calculate_optimal_stops(&waypoints, route.distance_miles())?;
        Ok(FuelPlan { stops, waypoints })
    }

    /// Choose stops for a route already sampled into `waypoints`.
    ///
    /// Returns an empty list when the route fits inside one tank.
    ///
    /// # Errors
    ///
    /// - [`PlanError::InvalidConfig`] when the parameters are unusable.
    /// - [`PlanError::InvalidRoute`] when stops are needed but `waypoints` is
    ///   empty.
    /// - [`PlanError::NoStationFound`] when every search came back empty.
    /// - [`PlanError::StalledProgress`] when the chosen station does not move
    ///   the plan forward.
    pub fn calculate_optimal_stops(
        &self,
        waypoints: &[Waypoint],
        total_distance_miles: f64,
    ) -> Result<Vec<FuelStop>, PlanError> {
        self.config.validate()?;
        let max_range = self.config.max_range_miles;
        let gallons = self.config.tank_capacity_gallons();
        let gallons_decimal =
            Decimal::from_f64(gallons).ok_or_else(|| PlanError::InvalidConfig {
                reason: format!("tank capacity {gallons} is not representable"),
            })?;

        let mut stops = Vec::new();
        let mut state = LegState::start(max_range);

        while state.needs_fuel(total_distance_miles) {
            if waypoints.is_empty() {
                return Err(PlanError::InvalidRoute {
                    reason: "route needs fuel stops but has no waypoints".to_owned(),
                });
            }

            let station = self.select_station(waypoints, total_distance_miles, state)?;
            let station_distance = nearest_waypoint_to_point(waypoints, station.location)
                .map_or(state.current_distance, |waypoint| waypoint.cumulative_miles);

            if station_distance <= state.current_distance {
                log::warn!(
                    "station {} at mile {station_distance:.1} does not advance past mile {:.1}",
                    station.station_id,
                    state.current_distance
                );
                return Err(PlanError::StalledProgress {
                    current_distance_miles: state.current_distance,
                    station_distance_miles: station_distance,
                    station_id: station.station_id,
                });
            }

            let cost = (station.price_per_gallon * gallons_decimal).round_dp(2);
            log::info!(
                "stop {} at mile {station_distance:.1}: {} ({}) at ${}/gal",
                state.stop_number,
                station.name,
                station.station_id,
                station.price_per_gallon
            );
            stops.push(FuelStop {
                stop_number: state.stop_number,
                station,
                distance_from_start_miles: station_distance,
                fuel_amount_gallons: gallons,
                cost,
            });
            state = state.refuelled_at(station_distance, max_range);
        }

        Ok(stops)
    }

    fn select_station(
        &self,
        waypoints: &[Waypoint],
        total_distance_miles: f64,
        state: LegState,
    ) -> Result<FuelStation, PlanError> {
        let target = (state.current_distance + self.config.max_range_miles
            - self.config.safety_margin_miles)
            .min(total_distance_miles);

        let radii = std::iter::once(self.config.search_radius_miles)
            .chain(self.config.fallback_radii_miles.iter().copied());
        for (attempt, radius) in radii.enumerate() {
            if attempt > 0 {
                log::debug!("widening station search near mile {target:.1} to {radius} miles");
            }
            if let Some(station) = self.cheapest_near(waypoints, target, radius) {
                return Ok(station);
            }
        }

        let midpoint = state.current_distance + state.fuel_range_remaining / 2.0;
        let radius = self.config.midpoint_radius_miles();
        log::debug!(
            "no station near mile {target:.1}; falling back to mile {midpoint:.1} within \
             {radius} miles"
        );
        if let Some(station) = self.cheapest_near(waypoints, midpoint, radius) {
            return Ok(station);
        }

        log::warn!("no fuel station found near mile {midpoint:.1}");
        Err(PlanError::NoStationFound {
            target_distance_miles: midpoint,
        })
    }

    fn cheapest_near(
        &self,
        waypoints: &[Waypoint],
        target_miles: f64,
        radius_miles: f64,
    ) -> Option<FuelStation> {
        let center = nearest_waypoint_to_distance(waypoints, target_miles)?;
        find_stations_in_radius(&self.catalog, center.location, radius_miles)
            .into_iter()
            // `min_by` keeps the first of equally cheap stations.
            .min_by(|a, b| a.price_per_gallon.cmp(&b.price_per_gallon))
    }
}

/// Waypoint whose cumulative mileage is closest to `target_miles`.
///
/// Ties go to the earlier waypoint.
fn nearest_waypoint_to_distance(waypoints: &[Waypoint], target_miles: f64) -> Option<&Waypoint> {
    waypoints.iter().min_by(|a, b| {
        (a.cumulative_miles - target_miles)
            .abs()
            .total_cmp(&(b.cumulative_miles - target_miles).abs())
    })
}

/// Waypoint geodesically closest to `point`.
fn nearest_waypoint_to_point(waypoints: &[Waypoint], point: Coord<f64>) -> Option<&Waypoint> {
    waypoints.iter().min_by(|a, b| {
        distance_miles(a.location, point).total_cmp(&distance_miles(b.location, point))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryCatalog, equator_longitude_at, equator_route, station};
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    fn route_of_miles(miles: f64) -> RouteGeometry {
        let step = 0.1;
        let points = (equator_longitude_at(miles) / step).ceil() as usize + 1;
        equator_route(points, step)
    }

    /// A 1250-mile route along the equator traced every ~6.9 miles.
    #[fixture]
    fn long_route() -> RouteGeometry {
        route_of_miles(1250.0)
    }

    /// Stations every 40 miles, each a cent dearer than the one before.
    #[fixture]
    fn stations_every_40_miles() -> MemoryCatalog {
        MemoryCatalog::with_stations((1..=32).map(|i| {
            let lon = equator_longitude_at(f64::from(i) * 40.0);
            let mut s = station(&format!("s{i:02}"), lon, 0.0, "0");
            s.price_per_gallon = Decimal::new(300 + i64::from(i), 2);
            s
        }))
    }

    #[rstest]
    fn short_route_needs_no_stops(stations_every_40_miles: MemoryCatalog) {
        let planner = FuelPlanner::new(stations_every_40_miles);
        let route = equator_route(60, 0.1);
        assert!(route.distance_miles() < 500.0);

        let plan = planner.plan(&route).expect("plan short route");
        assert!(plan.stops.is_empty());
        assert!(plan.waypoints.len() >= 2);
    }

    #[rstest]
    fn long_route_gets_three_cheapest_stops(
        long_route: RouteGeometry,
        stations_every_40_miles: MemoryCatalog,
    ) {
        let planner = FuelPlanner::new(stations_every_40_miles.clone());
        let plan = planner.plan(&long_route).expect("plan long route");

        assert_eq!(plan.stops.len(), 3);
        let mut previous = 0.0;
        for (index, stop) in plan.stops.iter().enumerate() {
            assert_eq!(stop.stop_number as usize, index + 1);
            assert!(stop.distance_from_start_miles > previous);
            assert_eq!(stop.fuel_amount_gallons, 50.0);
            assert_eq!(
                stop.cost,
                (stop.station.price_per_gallon * dec!(50)).round_dp(2)
            );

            let target = previous + 450.0;
            let center = nearest_waypoint_to_distance(&plan.waypoints, target)
                .expect("waypoints")
                .location;
            let cheapest = find_stations_in_radius(&stations_every_40_miles, center, 100.0)
                .into_iter()
                .map(|s| s.price_per_gallon)
                .min()
                .expect("stations near target");
            assert_eq!(stop.station.price_per_gallon, cheapest);
            previous = stop.distance_from_start_miles;
        }
    }

    #[rstest]
    fn empty_catalog_reports_midpoint_target(long_route: RouteGeometry) {
        let planner = FuelPlanner::new(MemoryCatalog::default());
        let err = planner.plan(&long_route).expect_err("no stations");
        assert_eq!(
            err,
            PlanError::NoStationFound {
                target_distance_miles: 250.0
            }
        );
    }

    #[rstest]
    fn widens_the_search_radius() {
        // The only station sits ~175 miles beyond the first search centre.
        let catalog = MemoryCatalog::with_station(station(
            "far",
            equator_longitude_at(630.0),
            0.0,
            "3.10",
        ));
        let planner = FuelPlanner::new(catalog);
        let plan = planner.plan(&route_of_miles(900.0)).expect("plan");

        assert_eq!(plan.stops.len(), 1);
        assert_eq!(plan.stops[0].station.station_id, "far");
        assert_eq!(plan.stops[0].cost, dec!(155.00));
    }

    #[rstest]
    fn first_of_equal_prices_wins(long_route: RouteGeometry) {
        let catalog = MemoryCatalog::with_stations([
            station("b", equator_longitude_at(440.0), 0.0, "3.00"),
            station("a", equator_longitude_at(460.0), 0.0, "3.00"),
            station("c", equator_longitude_at(860.0), 0.0, "3.00"),
        ]);
        let planner = FuelPlanner::new(catalog);
        let plan = planner.plan(&long_route).expect("plan");
        assert_eq!(plan.stops[0].station.station_id, "a");
    }

    #[rstest]
    fn station_behind_current_position_stalls(long_route: RouteGeometry) {
        // One cheap station at the very start of the route is the only
        // candidate for the midpoint fallback of the first hop.
        let catalog = MemoryCatalog::with_station(station("origin", 0.0, 0.0, "2.00"));
        let config = PlannerConfig {
            search_radius_miles: 300.0,
            fallback_radii_miles: Vec::new(),
            ..PlannerConfig::default()
        };
        let planner = FuelPlanner::with_config(catalog, config);
        let err = planner.plan(&long_route).expect_err("cannot advance");
        assert!(matches!(
            err,
            PlanError::StalledProgress { ref station_id, current_distance_miles, .. }
                if station_id == "origin" && current_distance_miles == 0.0
        ));
    }

    #[rstest]
    #[case(PlannerConfig { mpg: 0.0, ..PlannerConfig::default() })]
    #[case(PlannerConfig { max_range_miles: f64::NAN, ..PlannerConfig::default() })]
    #[case(PlannerConfig { safety_margin_miles: 500.0, ..PlannerConfig::default() })]
    #[case(PlannerConfig { fallback_radii_miles: vec![-1.0], ..PlannerConfig::default() })]
    fn rejects_unusable_config(#[case] config: PlannerConfig, long_route: RouteGeometry) {
        let planner = FuelPlanner::with_config(MemoryCatalog::default(), config);
        let err = planner.plan(&long_route).expect_err("invalid config");
        assert!(matches!(err, PlanError::InvalidConfig { .. }));
    }

    #[rstest]
    fn nearest_waypoint_prefers_earlier_on_ties() {
        let waypoints = [
            Waypoint::new(Coord { x: 0.0, y: 0.0 }, 0.0),
            Waypoint::new(Coord { x: 1.0, y: 0.0 }, 10.0),
            Waypoint::new(Coord { x: 2.0, y: 0.0 }, 20.0),
        ];
        let found = nearest_waypoint_to_distance(&waypoints, 15.0).expect("non-empty");
        assert_eq!(found.cumulative_miles, 10.0);
    }

    #[rstest]
    fn missing_waypoints_are_rejected_when_stops_are_needed() {
        let planner = FuelPlanner::new(MemoryCatalog::default());
        let err = planner
            .calculate_optimal_stops(&[], 900.0)
            .expect_err("no waypoints");
        assert!(matches!(err, PlanError::InvalidRoute { .. }));
    }
}
