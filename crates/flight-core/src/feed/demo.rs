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

//! Synthetic feed for running without a backend.

use std::future::Future;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use super::{clock_time, FeedError, FeedSnapshot, FlightSource};
use crate::flight::{MILITARY_PREFIXES, PRIVATE_PREFIXES};

const DEMO_FLIGHT_COUNT: usize = 25;
const POSITION_JITTER_DEG: f64 = 2.0;

struct City {
    latitude: f64,
    longitude: f64,
    country: &'static str,
}

const CITIES: [City; 10] = [
    City { latitude: 40.7128, longitude: -74.0060, country: "United States" },
    City { latitude: 51.5074, longitude: -0.1278, country: "United Kingdom" },
    City { latitude: 35.6762, longitude: 139.6503, country: "Japan" },
    City { latitude: 48.8566, longitude: 2.3522, country: "France" },
    City { latitude: -33.8688, longitude: 151.2093, country: "Australia" },
    City { latitude: 25.2048, longitude: 55.2708, country: "UAE" },
    City { latitude: 1.3521, longitude: 103.8198, country: "Singapore" },
    City { latitude: 34.0522, longitude: -118.2437, country: "United States" },
    City { latitude: 50.1109, longitude: 8.6821, country: "Germany" },
    City { latitude: 22.3193, longitude: 114.1694, country: "China" },
];

/// Generates a fresh set of random flights around major cities on every fetch.
#[derive(Debug)]
pub struct DemoSource {
    rng: Mutex<StdRng>,
}

impl Default for DemoSource {
    fn default() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }
}

impl DemoSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic generator, for tests.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Build one snapshot of demo flights.
    #[must_use]
    pub fn generate(&self) -> FeedSnapshot {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = clock_time();

        let flights: Vec<Value> = (0..DEMO_FLIGHT_COUNT)
            .map(|i| demo_flight(&mut *rng, i, &now))
            .collect();

        FeedSnapshot {
            count: flights.len(),
            flights,
            last_updated: now,
            demo_mode: true,
        }
    }
}

fn demo_flight<R: Rng>(rng: &mut R, index: usize, now: &str) -> Value {
    let origin_index = rng.gen_range(0..CITIES.len());
    // Any other city
    let destination_index = (origin_index + rng.gen_range(1..CITIES.len())) % CITIES.len();
    let origin = &CITIES[origin_index];
    let destination = &CITIES[destination_index];

    let prefixes: &[&str] = if rng.gen_bool(0.5) {
        &MILITARY_PREFIXES
    } else {
        &PRIVATE_PREFIXES
    };
    let prefix = prefixes.choose(rng).copied().unwrap_or("N");

    json!({
        "icao24": format!("demo{index:03}"),
        "callsign": format!("{prefix}{}", rng.gen_range(10..=999)),
        "origin_country": origin.country,
        "destination_country": destination.country,
        "latitude": origin.latitude + rng.gen_range(-POSITION_JITTER_DEG..POSITION_JITTER_DEG),
        "longitude": origin.longitude + rng.gen_range(-POSITION_JITTER_DEG..POSITION_JITTER_DEG),
        "altitude": rng.gen_range(8000..=12000),
        "velocity": rng.gen_range(200..=300),
        "heading": rng.gen_range(0..360),
        "last_contact": now,
    })
}

impl FlightSource for DemoSource {
    fn fetch(&self) -> impl Future<Output = Result<FeedSnapshot, FeedError>> + Send {
        let snapshot = self.generate();
        async move { Ok(snapshot) }
    }

    fn describe(&self) -> String {
        "demo data".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::Flight;

    #[test]
    fn test_demo_snapshot_shape() {
        let snapshot = DemoSource::seeded(7).generate();

        assert!(snapshot.demo_mode);
        assert_eq!(snapshot.count, 25);
        assert_eq!(snapshot.flights.len(), 25);
        assert_eq!(snapshot.flights[0]["icao24"], "demo000");
        assert_eq!(snapshot.flights[24]["icao24"], "demo024");
    }

    #[test]
    fn test_demo_flights_in_range() {
        let snapshot = DemoSource::seeded(42).generate();

        for record in &snapshot.flights {
            let flight = Flight::from_record(record);
            assert!(flight.position.is_some());
            assert!((8000.0..=12000.0).contains(&flight.altitude));
            assert!((200.0..=300.0).contains(&flight.velocity));
            assert!((0.0..360.0).contains(&flight.heading));
            assert_ne!(flight.destination_country.as_deref(), None);
            // Every demo callsign is classified one way or the other
            assert!(flight.is_military() || flight.is_private());
        }
    }

    #[test]
    fn test_seeded_sources_agree() {
        let a = DemoSource::seeded(3).generate();
        let b = DemoSource::seeded(3).generate();
        let callsigns = |s: &FeedSnapshot| -> Vec<Value> {
            s.flights.iter().map(|f| f["callsign"].clone()).collect()
        };
        assert_eq!(callsigns(&a), callsigns(&b));
    }

    #[tokio::test]
    async fn test_fetch_yields_demo_snapshot() {
        let snapshot = DemoSource::seeded(1).fetch().await.unwrap();
        assert!(snapshot.demo_mode);
    }
}
