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

//! Flight feed sources.
//!
//! A feed refresh yields a [`FeedSnapshot`]: the raw flight records plus the
//! counters the backend reports with them. Records stay as raw JSON until
//! the data manager ingests them, so one malformed record only loses its
//! own fields.
//!
//! Expected payload:
//!
//! ```json
//! {"flights": [...], "count": 25, "last_updated": "12:00:00", "demo_mode": false}
//! ```

mod demo;

use std::future::Future;
use std::time::Duration;

use log::debug;
use serde_json::Value;
use thiserror::Error;

pub use demo::DemoSource;

/// Errors from a single feed refresh.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("invalid payload: {0}")]
    Payload(String),

    #[error("payload has no flights array")]
    MissingFlights,
}

/// One successful feed refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSnapshot {
    /// Flight count as reported by the backend.
    pub count: usize,
    pub flights: Vec<Value>,
    pub last_updated: String,
    pub demo_mode: bool,
}

/// Current local time in the `HH:MM:SS` form the feed uses.
#[must_use]
pub fn clock_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Parse a feed response body.
///
/// Only `flights` is required. A missing `count` falls back to the number
/// of records and a missing `last_updated` to the local time.
pub fn parse_snapshot(body: &[u8]) -> Result<FeedSnapshot, FeedError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| FeedError::Payload(e.to_string()))?;

    let Value::Object(mut fields) = value else {
        return Err(FeedError::Payload("expected a JSON object".to_string()));
    };

    let flights = match fields.remove("flights") {
        Some(Value::Array(flights)) => flights,
        _ => return Err(FeedError::MissingFlights),
    };

    let count = fields
        .get("count")
        .and_then(Value::as_u64)
        .and_then(|c| usize::try_from(c).ok())
        .unwrap_or(flights.len());
    let last_updated = fields
        .get("last_updated")
        .and_then(Value::as_str)
        .map_or_else(clock_time, str::to_string);
    let demo_mode = fields
        .get("demo_mode")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(FeedSnapshot {
        count,
        flights,
        last_updated,
        demo_mode,
    })
}

/// Something that can produce feed snapshots.
pub trait FlightSource {
    fn fetch(&self) -> impl Future<Output = Result<FeedSnapshot, FeedError>> + Send;

    /// Short human-readable description for logs.
    fn describe(&self) -> String;
}

/// Default request timeout for the HTTP source.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches snapshots from the dashboard backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSource {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, FeedError> {
        Self::with_timeout(endpoint, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("flight-tracker/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl FlightSource for HttpSource {
    async fn fetch(&self) -> Result<FeedSnapshot, FeedError> {
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let snapshot = parse_snapshot(&body)?;
        debug!(
            "Fetched {} flights from {} (demo: {})",
            snapshot.flights.len(),
            self.endpoint,
            snapshot.demo_mode
        );
        Ok(snapshot)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_payload() {
        let body = br#"{
            "flights": [{"icao24": "abc"}, {"icao24": "def"}],
            "count": 7,
            "last_updated": "10:15:00",
            "demo_mode": true
        }"#;
        let snapshot = parse_snapshot(body).unwrap();

        assert_eq!(snapshot.flights.len(), 2);
        assert_eq!(snapshot.count, 7);
        assert_eq!(snapshot.last_updated, "10:15:00");
        assert!(snapshot.demo_mode);
    }

    #[test]
    fn test_parse_minimal_payload() {
        let snapshot = parse_snapshot(br#"{"flights": []}"#).unwrap();
        assert_eq!(snapshot.count, 0);
        assert!(!snapshot.demo_mode);
        assert_eq!(snapshot.last_updated.len(), 8);
    }

    #[test]
    fn test_missing_flights_is_error() {
        assert!(matches!(
            parse_snapshot(br#"{"count": 3}"#),
            Err(FeedError::MissingFlights)
        ));
        assert!(matches!(
            parse_snapshot(br#"{"flights": "nope"}"#),
            Err(FeedError::MissingFlights)
        ));
    }

    #[test]
    fn test_unparseable_body_is_error() {
        assert!(matches!(
            parse_snapshot(b"<html>502 Bad Gateway</html>"),
            Err(FeedError::Payload(_))
        ));
        assert!(matches!(parse_snapshot(b"[1, 2]"), Err(FeedError::Payload(_))));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(FeedError::Status(429).to_string(), "server returned status 429");
        assert_eq!(
            FeedError::MissingFlights.to_string(),
            "payload has no flights array"
        );
    }

    #[test]
    fn test_http_source_describe() {
        let source = HttpSource::new("http://localhost:5000/api/flights").unwrap();
        assert_eq!(source.describe(), "http://localhost:5000/api/flights");
        assert_eq!(source.endpoint(), "http://localhost:5000/api/flights");
    }
}
