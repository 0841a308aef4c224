//! Text serializations of a route: GPX, KML, CSV and JSON.
//!
//! Exporters are pure; writing the text somewhere is up to the caller.
//! Names and addresses are escaped for each format, and an empty path still
//! produces a well-formed document.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::analytics::RouteAnalytics;
use crate::error::{PlannerError, Result};
use crate::stop::{Stop, StopId};

/// Route name used when the caller does not provide one.
pub const DEFAULT_ROUTE_NAME: &str = "Optimized Route";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExportFormat {
    Gpx,
    Kml,
    Csv,
    Json,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Gpx,
        ExportFormat::Kml,
        ExportFormat::Csv,
        ExportFormat::Json,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Gpx => "gpx",
            ExportFormat::Kml => "kml",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Gpx => "application/gpx+xml",
            ExportFormat::Kml => "application/vnd.google-earth.kml+xml",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
        }
    }
}

/// Serializes `path` in the requested format.
pub fn export(path: &[Stop], format: ExportFormat, route_name: &str) -> Result<String> {
    match format {
        ExportFormat::Gpx => to_gpx(path, route_name),
        ExportFormat::Kml => to_kml(path, route_name),
        ExportFormat::Csv => to_csv(path),
        ExportFormat::Json => to_json(path, route_name),
    }
}

// ============================================================================
// XML formats
// ============================================================================

pub fn to_gpx(path: &[Stop], route_name: &str) -> Result<String> {
    let mut out = String::new();
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        out,
        r#"<gpx version="1.1" creator="route-planner" xmlns="http://www.topografix.com/GPX/1/1">"#
    )?;
    writeln!(out, "  <trk>")?;
    writeln!(out, "    <name>{}</name>", escape_xml(route_name))?;
    writeln!(out, "    <trkseg>")?;
    for stop in path {
        writeln!(
            out,
            r#"      <trkpt lat="{}" lon="{}"><name>{}</name></trkpt>"#,
            stop.latitude(),
            stop.longitude(),
            escape_xml(stop.name())
        )?;
    }
    writeln!(out, "    </trkseg>")?;
    writeln!(out, "  </trk>")?;
    writeln!(out, "</gpx>")?;
    Ok(out)
}

pub fn to_kml(path: &[Stop], route_name: &str) -> Result<String> {
    let mut out = String::new();
    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, r#"<kml xmlns="http://www.opengis.net/kml/2.2">"#)?;
    writeln!(out, "  <Document>")?;
    writeln!(out, "    <name>{}</name>", escape_xml(route_name))?;
    for (index, stop) in path.iter().enumerate() {
        writeln!(out, "    <Placemark>")?;
        writeln!(out, "      <name>Stop {}: {}</name>", index + 1, escape_xml(stop.name()))?;
        if !stop.address().is_empty() {
            writeln!(out, "      <description>{}</description>", escape_xml(stop.address()))?;
        }
        writeln!(
            out,
            "      <Point><coordinates>{},{},0</coordinates></Point>",
            stop.longitude(),
            stop.latitude()
        )?;
        writeln!(out, "    </Placemark>")?;
    }
    writeln!(out, "  </Document>")?;
    writeln!(out, "</kml>")?;
    Ok(out)
}

/// Escapes XML markup characters and drops anything outside the XML 1.0
/// `Char` production.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\t' | '\n' | '\r' => escaped.push(ch),
            '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}' => {
                escaped.push(ch)
            }
            _ => {}
        }
    }
    escaped
}

// ============================================================================
// CSV
// ============================================================================

pub fn to_csv(path: &[Stop]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(["Stop", "Name", "Latitude", "Longitude", "Address"])?;
    for (index, stop) in path.iter().enumerate() {
        writer.write_record([
            (index + 1).to_string(),
            stop.name().to_string(),
            stop.latitude().to_string(),
            stop.longitude().to_string(),
            stop.address().to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| PlannerError::Export(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| PlannerError::Export(err.to_string()))
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct JsonDocument {
    route: JsonRoute,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonRoute {
    name: String,
    total_stops: usize,
    total_distance: f64,
    estimated_time: u32,
    stops: Vec<JsonStop>,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonStop {
    stop: usize,
    id: StopId,
    name: String,
    latitude: f64,
    longitude: f64,
    address: String,
}

pub fn to_json(path: &[Stop], route_name: &str) -> Result<String> {
    let analytics = RouteAnalytics::compute(path);
    let document = JsonDocument {
        route: JsonRoute {
            name: route_name.to_string(),
            total_stops: analytics.total_stops,
            total_distance: analytics.total_distance_km,
            estimated_time: analytics.estimated_time_minutes,
            stops: path
                .iter()
                .enumerate()
                .map(|(index, stop)| JsonStop {
                    stop: index + 1,
                    id: stop.id(),
                    name: stop.name().to_string(),
                    latitude: stop.latitude(),
                    longitude: stop.longitude(),
                    address: stop.address().to_string(),
                })
                .collect(),
        },
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Reads the stop list back out of a JSON export, in stop-number order.
pub fn parse_json_stops(text: &str) -> Result<Vec<Stop>> {
    let mut document: JsonDocument = serde_json::from_str(text)?;
    document.route.stops.sort_by_key(|stop| stop.stop);
    document
        .route
        .stops
        .into_iter()
        .map(|stop| -> Result<Stop> {
            let parsed = Stop::new(stop.id, stop.name, stop.latitude, stop.longitude)?;
            Ok(parsed.with_address(stop.address))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(id: i64, name: &str, lat: f64, lon: f64, address: &str) -> Stop {
        Stop::new(StopId(id), name, lat, lon).unwrap().with_address(address)
    }

    fn three_stops() -> Vec<Stop> {
        vec![
            stop(1, "A", 10.0, 20.0, "Addr1"),
            stop(2, "B", 10.1, 20.1, "Addr2"),
            stop(3, "C", 10.2, 20.2, "Addr3"),
        ]
    }

    #[test]
    fn test_csv_has_header_and_numbered_rows() {
        let csv = to_csv(&three_stops()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Stop,Name,Latitude,Longitude,Address");
        assert_eq!(lines[1], "1,A,10,20,Addr1");
        assert!(lines[2].starts_with("2,B,"));
        assert!(lines[3].starts_with("3,C,"));
    }

    #[test]
    fn test_csv_quotes_delimiters() {
        let path = vec![stop(1, "Smith, \"Bob\"", 1.0, 2.0, "1 Main St, Apt 2")];
        let csv = to_csv(&path).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert_eq!(row, r#"1,"Smith, ""Bob""",1,2,"1 Main St, Apt 2""#);
    }

    #[test]
    fn test_empty_exports_are_well_formed() {
        assert_eq!(to_csv(&[]).unwrap().lines().count(), 1);

        let gpx = to_gpx(&[], "r").unwrap();
        assert!(gpx.contains("<trkseg>") && gpx.contains("</trkseg>"));
        assert!(!gpx.contains("<trkpt"));

        let kml = to_kml(&[], "r").unwrap();
        assert!(kml.contains("<Document>") && kml.contains("</Document>"));
        assert!(!kml.contains("<Placemark>"));

        let json: serde_json::Value = serde_json::from_str(&to_json(&[], "r").unwrap()).unwrap();
        assert_eq!(json["route"]["totalStops"], 0);
        assert!(json["route"]["stops"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_gpx_track_points_in_order() {
        let gpx = to_gpx(&three_stops(), DEFAULT_ROUTE_NAME).unwrap();
        let first = gpx.find(r#"<trkpt lat="10" lon="20"><name>A</name></trkpt>"#).unwrap();
        let last = gpx.find("<name>C</name>").unwrap();
        assert!(first < last);
    }

    #[test]
    fn test_kml_placemarks_use_lon_lat_order() {
        let kml = to_kml(&three_stops(), DEFAULT_ROUTE_NAME).unwrap();
        assert!(kml.contains("<name>Stop 2: B</name>"));
        assert!(kml.contains("<coordinates>20.1,10.1,0</coordinates>"));
        assert!(kml.contains("<description>Addr3</description>"));
    }

    #[test]
    fn test_xml_escaping() {
        let path = vec![stop(1, "Fish & Chips <Joe's>", 1.0, 2.0, "\"Quoted\"\u{7}")];
        let kml = to_kml(&path, "A&B").unwrap();
        assert!(kml.contains("<name>Stop 1: Fish &amp; Chips &lt;Joe&apos;s&gt;</name>"));
        assert!(kml.contains("<description>&quot;Quoted&quot;</description>"));
        assert!(kml.contains("<name>A&amp;B</name>"));
    }

    #[test]
    fn test_xml_keeps_only_legal_characters() {
        assert_eq!(escape_xml("a\u{85}b"), "a\u{85}b");
        assert_eq!(escape_xml("a\u{1}\u{FFFE}\u{FFFF}b"), "ab");
        assert_eq!(escape_xml("tab\tline\n\u{1F69A}"), "tab\tline\n\u{1F69A}");
    }

    #[test]
    fn test_json_round_trip() {
        let path = vec![
            stop(7, "Käse \"Laden\"\n2nd floor", 36.1263781, -115.165818, "3131 S Las Vegas Blvd"),
            stop(3, "B", -33.8688, 151.2093, ""),
        ];
        let json = to_json(&path, "Tuesday").unwrap();
        let parsed = parse_json_stops(&json).unwrap();

        assert_eq!(parsed.len(), path.len());
        for (written, back) in path.iter().zip(&parsed) {
            assert_eq!(written.id(), back.id());
            assert_eq!(written.name(), back.name());
            assert!((written.latitude() - back.latitude()).abs() < 1e-12);
            assert!((written.longitude() - back.longitude()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_json_summary_fields() {
        let text = to_json(&three_stops(), "Morning").unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let route = &json["route"];
        assert_eq!(route["name"], "Morning");
        assert_eq!(route["totalStops"], 3);
        assert!(route["totalDistance"].as_f64().unwrap() > 0.0);
        assert_eq!(route["stops"][2]["stop"], 3);
        assert_eq!(route["stops"][0]["address"], "Addr1");
    }
}
