//! Trip totals reported alongside the planned stops.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use crate::{FuelStop, PlanError, RouteGeometry};

/// Price assumed for the final leg when the plan has no stops.
pub const DEFAULT_FUEL_PRICE: Decimal = Decimal::from_parts(350, 0, 0, false, 2);

/// Cost and fuel totals for a planned trip.
///
/// Stops buy a full tank each; the leg after the last stop (or the whole
/// route when there are none) is costed at the mean price of the chosen
/// stations, falling back to [`DEFAULT_FUEL_PRICE`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use geo::Coord;
/// use rust_decimal::Decimal;
/// use fuelstop_core::{RouteGeometry, TripSummary};
///
/// let route = RouteGeometry::new(
///     vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }],
///     160_934.0,
///     Duration::from_secs(7_200),
/// )?;
/// let summary = TripSummary::from_plan(&route, &[], 10.0)?;
///
/// assert_eq!(summary.total_fuel_gallons, 10.0);
/// assert_eq!(summary.total_fuel_cost, Decimal::new(3500, 2));
/// # Ok::<(), fuelstop_core::PlanError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripSummary {
    /// Total route distance in miles, rounded to two places.
    pub total_distance_miles: f64,
    /// Expected driving time in hours, rounded to two places.
    pub duration_hours: f64,
    /// Number of planned stops.
    pub stop_count: usize,
    /// Miles driven after the last stop.
    pub final_leg_miles: f64,
    /// Gallons burnt on the final leg.
    pub final_leg_gallons: f64,
    /// Price per gallon used for the final leg.
    pub final_leg_price: Decimal,
    /// Fuel bought at stops plus the final leg, rounded to two places.
    pub total_fuel_gallons: f64,
    /// Money spent at stops plus the final leg, rounded to cents.
    pub total_fuel_cost: Decimal,
}

impl TripSummary {
    /// Aggregate `stops` planned along `route` for a vehicle doing `mpg`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidConfig`] when `mpg` is not a positive
    /// number.
    pub fn from_plan(
        route: &RouteGeometry,
        stops: &[FuelStop],
        mpg: f64,
    ) -> Result<Self, PlanError> {
        if !(mpg.is_finite() && mpg > 0.0) {
            return Err(PlanError::InvalidConfig {
                reason: format!("mpg must be a positive number, found {mpg}"),
            });
        }

        let total_miles = route.distance_miles();
        let final_leg_miles = stops
            .last()
            .map_or(total_miles, |stop| total_miles - stop.distance_from_start_miles);
        let final_leg_gallons = final_leg_miles / mpg;
        let final_leg_price = mean_price(stops).unwrap_or(DEFAULT_FUEL_PRICE);

        let final_leg_decimal =
            Decimal::from_f64(final_leg_gallons).ok_or_else(|| PlanError::InvalidConfig {
                reason: format!("final leg of {final_leg_gallons} gallons is not representable"),
            })?;
        let stop_cost: Decimal = stops.iter().map(|stop| stop.cost).sum();
        let stop_gallons: f64 = stops.iter().map(|stop| stop.fuel_amount_gallons).sum();

        Ok(Self {
            total_distance_miles: round2(total_miles),
            duration_hours: round2(route.duration_hours()),
            stop_count: stops.len(),
            final_leg_miles,
            final_leg_gallons,
            final_leg_price,
            total_fuel_gallons: round2(stop_gallons + final_leg_gallons),
            total_fuel_cost: (stop_cost + final_leg_decimal * final_leg_price).round_dp(2),
        })
    }
}

fn mean_price(stops: &[FuelStop]) -> Option<Decimal> {
    if stops.is_empty() {
        return None;
    }
    let total: Decimal = stops.iter().map(|stop| stop.station.price_per_gallon).sum();
    Some(total / Decimal::from(stops.len()))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::station;
    use geo::Coord;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn stop(number: u32, miles: f64, price: &str, cost: Decimal) -> FuelStop {
        FuelStop {
            stop_number: number,
            station: station(&format!("s{number}"), 0.0, 0.0, price),
            distance_from_start_miles: miles,
            fuel_amount_gallons: 50.0,
            cost,
        }
    }

    /// A route of exactly 1000 miles taking 16 hours.
    #[fixture]
    fn route() -> RouteGeometry {
        RouteGeometry::new(
            vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 15.0, y: 0.0 }],
            1000.0 / crate::geodesic::METERS_TO_MILES,
            Duration::from_secs(16 * 3600),
        )
        .expect("valid route")
    }

    #[rstest]
    fn default_price_is_three_fifty() {
        assert_eq!(DEFAULT_FUEL_PRICE, dec!(3.50));
    }

    #[rstest]
    fn no_stops_costs_the_whole_route_at_default_price(route: RouteGeometry) {
        let summary = TripSummary::from_plan(&route, &[], 10.0).expect("summary");
        assert_eq!(summary.stop_count, 0);
        assert!((summary.final_leg_miles - 1000.0).abs() < 1e-9);
        assert_eq!(summary.final_leg_price, dec!(3.50));
        assert_eq!(summary.total_fuel_gallons, 100.0);
        assert_eq!(summary.total_fuel_cost, dec!(350.00));
        assert_eq!(summary.duration_hours, 16.0);
    }

    #[rstest]
    fn final_leg_uses_mean_stop_price(route: RouteGeometry) {
        let stops = [
            stop(1, 400.0, "3.00", dec!(150.00)),
            stop(2, 800.0, "4.00", dec!(200.00)),
        ];
        let summary = TripSummary::from_plan(&route, &stops, 10.0).expect("summary");

        assert!((summary.final_leg_miles - 200.0).abs() < 1e-6);
        assert_eq!(summary.final_leg_price, dec!(3.50));
        assert_eq!(summary.total_fuel_gallons, 120.0);
        // 150 + 200 + 20 gallons at 3.50.
        assert_eq!(summary.total_fuel_cost, dec!(420.00));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f64::INFINITY)]
    fn rejects_unusable_mpg(route: RouteGeometry, #[case] mpg: f64) {
        let err = TripSummary::from_plan(&route, &[], mpg).expect_err("bad mpg");
        assert!(matches!(err, PlanError::InvalidConfig { .. }));
    }
}
