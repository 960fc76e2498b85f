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

//! Flight set ownership and filtering.
//!
//! The manager holds the flights from the most recent refresh together with
//! the active filter. The filtered view is computed on demand from those two
//! inputs only, so it can never drift out of sync with either.

use std::collections::BTreeSet;

use log::debug;
use serde_json::Value;

use crate::flight::{Flight, FlightId, NOT_AVAILABLE};

/// Countries offered as filter buttons when no configuration overrides them.
pub const DEFAULT_COUNTRIES: [&str; 12] = [
    "United States",
    "India",
    "France",
    "Latvia",
    "Germany",
    "United Kingdom",
    "China",
    "Japan",
    "Canada",
    "Australia",
    "Russia",
    "Brazil",
];

/// Active filter: selected origin countries plus the military-only toggle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub selected_countries: BTreeSet<String>,
    pub military_only: bool,
}

impl FilterState {
    #[must_use]
    pub fn matches(&self, flight: &Flight) -> bool {
        self.selected_countries.contains(&flight.origin_country)
            && (!self.military_only || flight.is_military())
    }
}

/// Owns the current flight set and the filter applied to it.
#[derive(Debug, Clone)]
pub struct FlightDataManager {
    flights: Vec<Flight>,
    filter: FilterState,
    /// Ordered country options for the filter controls.
    countries: Vec<String>,
}

impl Default for FlightDataManager {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTRIES.iter().map(|c| (*c).to_string()).collect())
    }
}

impl FlightDataManager {
    /// Create a manager offering `countries` as filter options, all selected.
    #[must_use]
    pub fn new(countries: Vec<String>) -> Self {
        let mut unique = Vec::with_capacity(countries.len());
        for country in countries {
            if !unique.contains(&country) {
                unique.push(country);
            }
        }

        Self {
            flights: Vec::new(),
            filter: FilterState {
                selected_countries: unique.iter().cloned().collect(),
                military_only: false,
            },
            countries: unique,
        }
    }

    /// Replace the entire flight set with freshly parsed records.
    pub fn ingest<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a Value>,
    {
        self.flights = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let mut flight = Flight::from_record(record);
                // Records without an identifier still need a distinct key
                if flight.id.as_str() == NOT_AVAILABLE {
                    flight.id = FlightId::from(format!("unidentified-{index}"));
                }
                flight
            })
            .collect();
        debug!("Ingested {} flights", self.flights.len());
    }

    /// Replace the entire flight set with already-built flights.
    pub fn replace(&mut self, flights: Vec<Flight>) {
        self.flights = flights;
    }

    pub fn set_country_selection(&mut self, country: &str, included: bool) {
        if included {
            self.filter.selected_countries.insert(country.to_string());
        } else {
            self.filter.selected_countries.remove(country);
        }
    }

    /// Flip a country's selection. Returns the new state.
    pub fn toggle_country(&mut self, country: &str) -> bool {
        let included = !self.is_country_selected(country);
        self.set_country_selection(country, included);
        included
    }

    pub fn set_military_only(&mut self, military_only: bool) {
        self.filter.military_only = military_only;
    }

    /// Flip the military-only toggle. Returns the new state.
    pub fn toggle_military_only(&mut self) -> bool {
        self.filter.military_only = !self.filter.military_only;
        self.filter.military_only
    }

    /// Flights passing the active filter, in ingestion order.
    #[must_use]
    pub fn filtered(&self) -> Vec<&Flight> {
        self.flights.iter().filter(|f| self.filter.matches(f)).collect()
    }

    #[must_use]
    pub fn get(&self, id: &FlightId) -> Option<&Flight> {
        self.flights.iter().find(|f| &f.id == id)
    }

    #[must_use]
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    #[must_use]
    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[must_use]
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    #[must_use]
    pub fn is_country_selected(&self, country: &str) -> bool {
        self.filter.selected_countries.contains(country)
    }

    #[must_use]
    pub fn military_only(&self) -> bool {
        self.filter.military_only
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }
}
