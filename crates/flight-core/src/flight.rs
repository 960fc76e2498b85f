// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Flight entity and callsign classification.
//!
//! A [`Flight`] is built from one raw feed record. Construction never fails:
//! missing or mistyped fields fall back to defaults so a single bad record
//! cannot take down a whole refresh.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display sentinel for absent text fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Origin country used when a record carries none.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

pub(crate) const MILITARY_PREFIXES: [&str; 6] = ["AF", "NAVY", "ARMY", "MARINE", "CG", "PAT"];
pub(crate) const PRIVATE_PREFIXES: [&str; 7] = ["N", "G", "D", "F", "HB", "VP", "C"];
const SHORT_CALLSIGN_MAX_CHARS: usize = 5;

/// Aircraft identity key (ICAO 24-bit address as reported by the feed).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(String);

impl FlightId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlightId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for FlightId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    fn is_valid(self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Display label for a flight. Military wins when both predicates match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightKind {
    Military,
    Private,
}

impl FlightKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            FlightKind::Military => "Military",
            FlightKind::Private => "Private",
        }
    }
}

/// True if the callsign is non-empty and starts with a military prefix.
#[must_use]
pub fn is_military_callsign(callsign: &str) -> bool {
    !callsign.is_empty() && MILITARY_PREFIXES.iter().any(|p| callsign.starts_with(p))
}

/// True if the callsign is non-empty and either starts with a private prefix
/// or is short enough to look like a tail number.
#[must_use]
pub fn is_private_callsign(callsign: &str) -> bool {
    !callsign.is_empty()
        && (PRIVATE_PREFIXES.iter().any(|p| callsign.starts_with(p))
            || callsign.chars().count() <= SHORT_CALLSIGN_MAX_CHARS)
}

/// A single aircraft as reported by one feed refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Flight {
    pub id: FlightId,
    /// Trimmed callsign; `None` when the feed sent nothing usable.
    pub callsign: Option<String>,
    pub origin_country: String,
    pub destination_country: Option<String>,
    pub position: Option<Position>,
    /// Altitude in meters.
    pub altitude: f64,
    /// Ground speed in meters per second.
    pub velocity: f64,
    /// Heading in degrees, north = 0.
    pub heading: f64,
    pub last_contact: Option<String>,
}

impl Flight {
    /// Build a flight from a raw feed record, defaulting anything missing.
    #[must_use]
    pub fn from_record(record: &Value) -> Self {
        let empty = Map::new();
        let fields = record.as_object().unwrap_or(&empty);

        let id = text_field(fields, "icao24")
            .or_else(|| text_field(fields, "id"))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let position = match (
            number_field(fields, "latitude"),
            number_field(fields, "longitude"),
        ) {
            (Some(lat), Some(lon)) => Some(Position::new(lat, lon)).filter(|p| p.is_valid()),
            _ => None,
        };

        Self {
            id: FlightId(id),
            callsign: text_field(fields, "callsign"),
            origin_country: text_field(fields, "origin_country")
                .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            destination_country: text_field(fields, "destination_country"),
            position,
            altitude: number_field(fields, "altitude").unwrap_or(0.0),
            velocity: number_field(fields, "velocity").unwrap_or(0.0),
            heading: number_field(fields, "heading").unwrap_or(0.0),
            last_contact: text_field(fields, "last_contact"),
        }
    }

    #[must_use]
    pub fn is_military(&self) -> bool {
        self.callsign.as_deref().is_some_and(is_military_callsign)
    }

    #[must_use]
    pub fn is_private(&self) -> bool {
        self.callsign.as_deref().is_some_and(is_private_callsign)
    }

    #[must_use]
    pub fn kind(&self) -> FlightKind {
        if self.is_military() {
            FlightKind::Military
        } else {
            FlightKind::Private
        }
    }

    #[must_use]
    pub fn callsign_or_default(&self) -> &str {
        self.callsign.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    #[must_use]
    pub fn destination_or_default(&self) -> &str {
        self.destination_country.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    #[must_use]
    pub fn last_contact_or_default(&self) -> &str {
        self.last_contact.as_deref().unwrap_or(NOT_AVAILABLE)
    }

    /// Ground speed in km/h, rounded for display.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, reason = "display value, speeds are far below i64 range")]
    pub fn speed_kmh(&self) -> i64 {
        (self.velocity * 3.6).round() as i64
    }
}

/// Read a text field, accepting numbers as text. Blank strings and the
/// `"N/A"` sentinel are treated as absent.
fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    let text = match fields.get(key)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if text.is_empty() || text == NOT_AVAILABLE {
        None
    } else {
        Some(text)
    }
}

/// Read a numeric field, accepting numeric strings.
fn number_field(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_military_prefixes() {
        for callsign in ["AF123", "NAVY7", "ARMY01", "MARINE1", "CG45", "PAT300"] {
            assert!(is_military_callsign(callsign), "{callsign} should be military");
        }
        assert!(!is_military_callsign(""));
        assert!(!is_military_callsign("UAL123"));
        // Prefix match is case sensitive
        assert!(!is_military_callsign("af123"));
    }

    #[test]
    fn test_private_prefixes_and_short_callsigns() {
        for callsign in ["N12345", "GABCD1", "DLH400", "FXYZ99", "HB1234", "VP-BAA", "CFABC1"] {
            assert!(is_private_callsign(callsign), "{callsign} should be private");
        }
        // Short callsign heuristic
        assert!(is_private_callsign("UAL1"));
        assert!(is_private_callsign("XYZAB"));
        assert!(!is_private_callsign("XYZABC"));
        assert!(!is_private_callsign(""));
    }

    #[test]
    fn test_predicates_can_overlap() {
        // "AF1" is both military and short
        assert!(is_military_callsign("AF1"));
        assert!(is_private_callsign("AF1"));

        let flight = Flight::from_record(&json!({"icao24": "a", "callsign": "AF1"}));
        assert_eq!(flight.kind(), FlightKind::Military);
    }

    #[test]
    fn test_from_record_full() {
        let flight = Flight::from_record(&json!({
            "icao24": "abc123",
            "callsign": "  NAVY42 ",
            "origin_country": "United States",
            "destination_country": "Japan",
            "latitude": 35.5,
            "longitude": 139.7,
            "altitude": 10500,
            "velocity": 250.0,
            "heading": 270,
            "last_contact": "12:00:00"
        }));

        assert_eq!(flight.id.as_str(), "abc123");
        assert_eq!(flight.callsign.as_deref(), Some("NAVY42"));
        assert_eq!(flight.origin_country, "United States");
        assert_eq!(flight.destination_country.as_deref(), Some("Japan"));
        assert_eq!(flight.position, Some(Position::new(35.5, 139.7)));
        assert!((flight.altitude - 10500.0).abs() < f64::EPSILON);
        assert_eq!(flight.speed_kmh(), 900);
        assert!(flight.is_military());
    }

    #[test]
    fn test_from_record_defaults() {
        let flight = Flight::from_record(&json!({"id": "x1"}));

        assert_eq!(flight.id.as_str(), "x1");
        assert_eq!(flight.callsign, None);
        assert_eq!(flight.callsign_or_default(), NOT_AVAILABLE);
        assert_eq!(flight.origin_country, UNKNOWN_COUNTRY);
        assert_eq!(flight.destination_or_default(), NOT_AVAILABLE);
        assert_eq!(flight.position, None);
        assert!(flight.altitude.abs() < f64::EPSILON);
        assert!(flight.velocity.abs() < f64::EPSILON);
        assert!(flight.heading.abs() < f64::EPSILON);
        assert!(!flight.is_military());
        assert!(!flight.is_private());
    }

    #[test]
    fn test_malformed_record_is_defaulted() {
        let flight = Flight::from_record(&json!({
            "icao24": 42,
            "callsign": ["not", "a", "string"],
            "latitude": "51.5",
            "longitude": {"bad": true},
            "altitude": "high",
            "velocity": null
        }));

        assert_eq!(flight.id.as_str(), "42");
        assert_eq!(flight.callsign, None);
        assert_eq!(flight.position, None);
        assert!(flight.altitude.abs() < f64::EPSILON);
        assert!(flight.velocity.abs() < f64::EPSILON);

        let not_an_object = Flight::from_record(&json!("garbage"));
        assert_eq!(not_an_object.id.as_str(), NOT_AVAILABLE);
    }

    #[test]
    fn test_sentinel_callsign_is_absent() {
        let flight = Flight::from_record(&json!({"icao24": "a", "callsign": "N/A"}));
        assert_eq!(flight.callsign, None);
        assert!(!flight.is_private());
    }

    #[test]
    fn test_out_of_range_position_rejected() {
        let flight = Flight::from_record(&json!({"icao24": "a", "latitude": 95.0, "longitude": 10.0}));
        assert_eq!(flight.position, None);

        let zero = Flight::from_record(&json!({"icao24": "b", "latitude": 0.0, "longitude": 0.0}));
        assert_eq!(zero.position, Some(Position::new(0.0, 0.0)));
    }
}
