//! Sample a route polyline into waypoints at a fixed mileage interval.

use geo::Coord;

use crate::geodesic::{METERS_TO_MILES, MILES_TO_METERS, distance_meters};
use crate::{PlanError, Waypoint};

/// Default spacing between sampled waypoints.
pub const DEFAULT_WAYPOINT_INTERVAL_MILES: f64 = 50.0;

/// A closing waypoint is appended when the last sample falls more than this
/// far short of the route's total distance.
pub const FINAL_WAYPOINT_TOLERANCE_MILES: f64 = 10.0;

/// Convert a route polyline into waypoints tagged with cumulative mileage.
///
/// The first waypoint is always the first coordinate at mile zero. Segment
/// lengths are accumulated in metres and a waypoint is emitted at the current
/// coordinate each time the running total crosses the next multiple of
/// `interval_miles`. If the last emitted waypoint ends more than
/// [`FINAL_WAYPOINT_TOLERANCE_MILES`] short of `total_distance_meters`, the
/// final coordinate is appended carrying the true route total.
///
/// # Errors
///
/// Returns [`PlanError::InvalidRoute`] when `geometry` has fewer than two
/// points.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use fuelstop_core::sample_waypoints;
///
/// let geometry = [Coord { x: 0.0, y: 0.0 }, Coord { x: 0.5, y: 0.5 }];
/// let waypoints = sample_waypoints(&geometry, 100_000.0, 50.0)?;
/// assert_eq!(waypoints.len(), 2);
/// assert_eq!(waypoints[0].cumulative_miles, 0.0);
/// assert!((waypoints[1].cumulative_miles - 62.1371).abs() < 1e-3);
/// # Ok::<(), fuelstop_core::PlanError>(())
/// ```
pub fn sample_waypoints(
    geometry: &[Coord<f64>],
    total_distance_meters: f64,
    interval_miles: f64,
) -> Result<Vec<Waypoint>, PlanError> {
    let (Some(&first), Some(&last)) = (geometry.first(), geometry.last()) else {
        return Err(degenerate(geometry.len()));
    };
    if geometry.len() < 2 {
        return Err(degenerate(geometry.len()));
    }

    let interval_meters = interval_miles * MILES_TO_METERS;
    let mut waypoints = vec![Waypoint::new(first, 0.0)];
    let mut cumulative_meters = 0.0;

    for segment in geometry.windows(2) {
        let [previous, current] = segment else {
            continue;
        };
        cumulative_meters += distance_meters(*previous, *current);

        let next_threshold = interval_meters * count_as_f64(waypoints.len());
        if cumulative_meters >= next_threshold {
            waypoints.push(Waypoint::new(*current, cumulative_meters * METERS_TO_MILES));
        }
    }

    let total_miles = total_distance_meters * METERS_TO_MILES;
    let last_sampled = waypoints
        .last()
        .map_or(0.0, |waypoint| waypoint.cumulative_miles);
    if last_sampled < total_miles - FINAL_WAYPOINT_TOLERANCE_MILES {
        waypoints.push(Waypoint::new(last, total_miles));
    }

    log::debug!(
        "sampled {} waypoints from {} route points",
        waypoints.len(),
        geometry.len()
    );
    Ok(waypoints)
}

fn degenerate(points: usize) -> PlanError {
    PlanError::InvalidRoute {
        reason: format!("geometry needs at least two points, found {points}"),
    }
}

// Waypoint counts stay far below 2^52, so the cast is exact.
fn count_as_f64(count: usize) -> f64 {
    count as f64
}
