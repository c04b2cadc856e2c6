//! Errors raised while validating routes and planning fuel stops.

use thiserror::Error;

/// Errors returned by route validation, waypoint sampling and
/// [`FuelPlanner::plan`](crate::FuelPlanner::plan).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    /// The route geometry is degenerate or its distance is not positive.
    #[error("invalid route: {reason}")]
    InvalidRoute {
        /// Human-readable description of the defect.
        reason: String,
    },
    /// A planner parameter is zero, negative or not finite.
    #[error("invalid planner configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the defect.
        reason: String,
    },
    /// Every search radius and the midpoint fallback came back empty.
    ///
    /// Not retryable: the station catalog has no coverage for this stretch of
    /// the route.
    #[error(
        "no fuel station found near mile {target_distance_miles:.1}; load more \
         station data or try a different route"
    )]
    NoStationFound {
        /// Route mileage of the last search attempt.
        target_distance_miles: f64,
    },
    /// The cheapest station mapped back onto the route at or behind the
    /// current position, so the plan would never advance.
    #[error(
        "station {station_id} maps to mile {station_distance_miles:.1}, which does \
         not advance past mile {current_distance_miles:.1}"
    )]
    StalledProgress {
        /// Mileage already covered when the station was selected.
        current_distance_miles: f64,
        /// Mileage of the waypoint nearest to the selected station.
        station_distance_miles: f64,
        /// Identifier of the selected station.
        station_id: String,
    },
}
