//! Visualise a planned route.
//!
//! Rendering is kept behind [`MapRenderer`] so callers can swap output formats
//! without touching the planner. Two renderers ship with the crate: a plain
//! OpenStreetMap link and a standalone Leaflet page.

use geo::Coord;

use crate::{FuelStop, RouteGeometry};

/// Leaflet release loaded by [`LeafletHtmlRenderer`].
const LEAFLET_VERSION: &str = "1.9.4";

/// Produce a textual rendering of a route and its stops.
pub trait MapRenderer {
    /// Render `route` with `stops` overlaid.
    fn render(&self, route: &RouteGeometry, stops: &[FuelStop]) -> String;
}

/// Zoom level that fits a route of `distance_miles` on screen.
#[must_use]
pub fn zoom_for_distance(distance_miles: f64) -> u8 {
    if distance_miles > 1000.0 {
        5
    } else if distance_miles > 500.0 {
        6
    } else {
        7
    }
}

/// Midpoint of the route's resolved start and finish.
#[must_use]
pub fn route_center(route: &RouteGeometry) -> Coord<f64> {
    let start = route.start();
    let finish = route.finish();
    Coord {
        x: (start.x + finish.x) / 2.0,
        y: (start.y + finish.y) / 2.0,
    }
}

/// Renders an openstreetmap.org link centred between start and finish.
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use geo::Coord;
/// use fuelstop_core::{MapRenderer, OsmLinkRenderer, RouteGeometry};
///
/// let route = RouteGeometry::new(
///     vec![Coord { x: -90.0, y: 40.0 }, Coord { x: -88.0, y: 42.0 }],
///     300_000.0,
///     Duration::from_secs(10_800),
/// )?;
/// assert_eq!(
///     OsmLinkRenderer.render(&route, &[]),
///     "https://www.openstreetmap.org/?mlat=41&mlon=-89#map=7/41/-89"
/// );
/// # Ok::<(), fuelstop_core::PlanError>(())
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct OsmLinkRenderer;

impl MapRenderer for OsmLinkRenderer {
    fn render(&self, route: &RouteGeometry, _stops: &[FuelStop]) -> String {
        let center = route_center(route);
        let zoom = zoom_for_distance(route.distance_miles());
        format!(
            "https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map={zoom}/{lat}/{lon}",
            lat = center.y,
            lon = center.x,
        )
    }
}

/// Renders a self-contained HTML page drawing the route with Leaflet.
///
/// The start is marked green, the finish red, the route is a blue polyline
/// and each stop is an orange marker whose popup lists the station, price,
/// distance, fuel and cost. Text taken from station data is HTML-escaped.
#[derive(Debug, Default, Clone)]
pub struct LeafletHtmlRenderer {
    start_label: Option<String>,
    finish_label: Option<String>,
}

impl LeafletHtmlRenderer {
    /// Create a renderer with generic start and finish labels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Label the start and finish markers with the locations the user typed.
    #[must_use]
    pub fn with_labels(mut self, start: impl Into<String>, finish: impl Into<String>) -> Self {
        self.start_label = Some(start.into());
        self.finish_label = Some(finish.into());
        self
    }
}

impl MapRenderer for LeafletHtmlRenderer {
    fn render(&self, route: &RouteGeometry, stops: &[FuelStop]) -> String {
        let center = route_center(route);
        let zoom = zoom_for_distance(route.distance_miles());
        let start = route.start();
        let finish = route.finish();
        let start_label = escape_html(self.start_label.as_deref().unwrap_or("Start"));
        let finish_label = escape_html(self.finish_label.as_deref().unwrap_or("Finish"));

        let mut script = String::new();
        script.push_str(&format!(
            "const map = L.map('map').setView([{}, {}], {zoom});\n",
            center.y, center.x
        ));
        script.push_str(
            "L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', \
             { attribution: '&copy; OpenStreetMap contributors' }).addTo(map);\n",
        );
        script.push_str(&format!(
            "L.polyline({}, {{ color: 'blue', weight: 4, opacity: 0.7 }})\
             .bindPopup('Route: {:.1} miles').addTo(map);\n",
            latlng_array(route.coordinates()),
            route.distance_miles()
        ));
        push_marker(
            &mut script,
            start,
            "green",
            &format!("<b>Start:</b> {start_label}"),
        );
        push_marker(
            &mut script,
            finish,
            "red",
            &format!("<b>Finish:</b> {finish_label}"),
        );
        for stop in stops {
            push_marker(
                &mut script,
                stop.station.location,
                "orange",
                &stop_popup(stop),
            );
        }

        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
             <title>Fuel route</title>\n\
             <link rel=\"stylesheet\" href=\"https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.css\">\n\
             <script src=\"https://unpkg.com/leaflet@{LEAFLET_VERSION}/dist/leaflet.js\"></script>\n\
             <style>html, body, #map {{ height: 100%; margin: 0; }}</style>\n\
             </head>\n<body>\n<div id=\"map\"></div>\n<script>\n{script}</script>\n\
             </body>\n</html>\n"
        )
    }
}

fn push_marker(script: &mut String, at: Coord<f64>, colour: &str, popup: &str) {
    script.push_str(&format!(
        "L.circleMarker([{}, {}], {{ color: '{colour}', fillColor: '{colour}', \
         fillOpacity: 0.9, radius: 8 }}).bindPopup({}).addTo(map);\n",
        at.y,
        at.x,
        js_string(popup)
    ));
}

fn stop_popup(stop: &FuelStop) -> String {
    let station = &stop.station;
    format!(
        "<div style='width: 200px'><b>Stop #{}</b><br><b>{}</b><br>{}, {}<br><hr>\
         <b>Price:</b> ${}/gal<br><b>Distance:</b> {:.1} mi<br>\
         <b>Fuel:</b> {:.1} gal<br><b>Cost:</b> ${:.2}</div>",
        stop.stop_number,
        escape_html(&station.name),
        escape_html(&station.city),
        escape_html(&station.state),
        station.price_per_gallon,
        stop.distance_from_start_miles,
        stop.fuel_amount_gallons,
        stop.cost,
    )
}

fn latlng_array(coordinates: &[Coord<f64>]) -> String {
    let pairs: Vec<String> = coordinates
        .iter()
        .map(|c| format!("[{}, {}]", c.y, c.x))
        .collect();
    format!("[{}]", pairs.join(", "))
}

/// Quote `text` as a single-quoted JavaScript string literal.
fn js_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '<' => quoted.push_str("\\x3C"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// Escape text for inclusion in HTML content or attribute values.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::station;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[fixture]
    fn route() -> RouteGeometry {
        RouteGeometry::new(
            vec![
                Coord { x: -90.0, y: 40.0 },
                Coord { x: -89.0, y: 41.0 },
                Coord { x: -88.0, y: 42.0 },
            ],
            300_000.0,
            Duration::from_secs(10_800),
        )
        .expect("valid route")
    }

    #[fixture]
    fn stop() -> FuelStop {
        let mut station = station("9-1", -89.0, 41.0, "3.25");
        station.name = "Joe's <Truck> Stop".into();
        station.city = "Peoria".into();
        station.state = "IL".into();
        FuelStop {
            stop_number: 1,
            station,
            distance_from_start_miles: 93.2,
            fuel_amount_gallons: 50.0,
            cost: dec!(162.50),
        }
    }

    #[rstest]
    #[case(1200.0, 5)]
    #[case(1000.0, 6)]
    #[case(501.0, 6)]
    #[case(500.0, 7)]
    #[case(12.0, 7)]
    fn zoom_tracks_distance(#[case] miles: f64, #[case] zoom: u8) {
        assert_eq!(zoom_for_distance(miles), zoom);
    }

    #[rstest]
    fn leaflet_page_draws_every_layer(route: RouteGeometry, stop: FuelStop) {
        let html = LeafletHtmlRenderer::new()
            .with_labels("Springfield, IL", "Chicago, IL")
            .render(&route, &[stop]);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("color: 'green'"));
        assert!(html.contains("color: 'red'"));
        assert!(html.contains("color: 'orange'"));
        assert!(html.contains("L.polyline([[40, -90], [41, -89], [42, -88]]"));
        assert!(html.contains("Springfield, IL"));
        assert!(html.contains("Stop #1"));
        assert!(html.contains("$3.25/gal"));
        assert!(html.contains("$162.50"));
    }

    #[rstest]
    fn map_centres_on_the_resolved_endpoints() {
        let route = RouteGeometry::new(
            vec![Coord { x: -89.5, y: 40.5 }, Coord { x: -88.0, y: 41.5 }],
            300_000.0,
            Duration::from_secs(10_800),
        )
        .expect("valid route")
        .with_endpoints(Coord { x: -90.0, y: 40.0 }, Coord { x: -88.0, y: 42.0 });

        assert_eq!(route_center(&route), Coord { x: -89.0, y: 41.0 });
        assert_eq!(
            OsmLinkRenderer.render(&route, &[]),
            "https://www.openstreetmap.org/?mlat=41&mlon=-89#map=7/41/-89"
        );

        let html = LeafletHtmlRenderer::new().render(&route, &[]);
        assert!(html.contains("setView([41, -89], 7)"));
        assert!(html.contains("L.circleMarker([40, -90], { color: 'green'"));
        assert!(html.contains("L.circleMarker([42, -88], { color: 'red'"));
    }

    #[rstest]
    fn leaflet_popups_escape_station_text(route: RouteGeometry, stop: FuelStop) {
        let html = LeafletHtmlRenderer::new().render(&route, &[stop]);
        assert!(html.contains("Joe&#39;s &lt;Truck&gt; Stop"));
        assert!(!html.contains("<Truck>"));
    }

    #[rstest]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[rstest]
    fn js_strings_cannot_close_the_script_block() {
        assert_eq!(js_string("</script>"), "'\\x3C/script>'");
        assert_eq!(js_string("it's"), "'it\\'s'");
    }
}
