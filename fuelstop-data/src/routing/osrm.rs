//! OSRM API response types for the Route service.
//!
//! Only the fields the planner needs are decoded: the first route's distance,
//! duration and GeoJSON line geometry.
//!
//! See: <http://project-osrm.org/docs/v5.24.0/api/#route-service>

use serde::Deserialize;

/// OSRM Route API response.
#[derive(Debug, Deserialize)]
pub struct RouteResponse {
    /// Status code from OSRM.
    ///
    /// Common values:
    /// - `"Ok"` - Request was successful
    /// - `"NoRoute"` - No route between the coordinates
    /// - `"InvalidQuery"` - Invalid query parameters
    pub code: String,

    /// Optional error message when `code` is not `"Ok"`.
    pub message: Option<String>,

    /// Candidate routes, best first.
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == "Ok"
    }
}

/// A single route in an OSRM response.
#[derive(Debug, Deserialize)]
pub struct Route {
    /// Route length in metres.
    pub distance: f64,
    /// Expected travel time in seconds.
    pub duration: f64,
    /// GeoJSON `LineString` geometry.
    pub geometry: LineString,
}

/// GeoJSON line geometry with `[longitude, latitude]` positions.
#[derive(Debug, Deserialize)]
pub struct LineString {
    /// Ordered positions along the route.
    pub coordinates: Vec<[f64; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 1609.34,
                "duration": 90.5,
                "weight": 90.5,
                "legs": [],
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-87.63, 41.88], [-87.62, 41.89]]
                }
            }],
            "waypoints": []
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        let route = &response.routes[0];
        assert_eq!(route.distance, 1609.34);
        assert_eq!(route.duration, 90.5);
        assert_eq!(route.geometry.coordinates[1], [-87.62, 41.89]);
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{
            "code": "NoRoute",
            "message": "Impossible route between points"
        }"#;

        let response: RouteResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(!response.is_ok());
        assert_eq!(
            response.message.as_deref(),
            Some("Impossible route between points")
        );
        assert!(response.routes.is_empty());
    }
}
