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

//! Presentation models derived from tracker state.
//!
//! [`render`] is the only way the presentation layer sees state. Everything a
//! frame needs (list rows, map markers, path overlay, detail view, status)
//! is computed here from one [`TrackerState`], so the list, the map and the
//! focus indicator cannot disagree.

use serde::{Deserialize, Serialize};

use crate::flight::{Flight, FlightId, FlightKind, Position};
use crate::geometry::{project_flight, FlightPath};
use crate::tracker::{ConnectionStatus, Focus, TrackerConfig, TrackerState};

/// Maximum rows shown in the flight list.
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Maximum markers placed on the map.
pub const DEFAULT_MAX_MARKERS: usize = 500;

/// Display caps for the list and the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderLimits {
    pub list_limit: usize,
    pub max_markers: usize,
}

impl Default for RenderLimits {
    fn default() -> Self {
        Self {
            list_limit: DEFAULT_LIST_LIMIT,
            max_markers: DEFAULT_MAX_MARKERS,
        }
    }
}

/// One row in the sidebar flight list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub id: FlightId,
    pub callsign: String,
    pub origin_country: String,
    pub kind: FlightKind,
    pub speed_kmh: i64,
    pub altitude_m: i64,
    pub last_contact: String,
    pub focused: bool,
}

/// Sidebar list contents. `total` counts every filtered flight, including
/// those beyond the display cap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListView {
    pub items: Vec<ListItem>,
    pub total: usize,
}

impl ListView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A map marker with the data its popup shows.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView {
    pub id: FlightId,
    pub position: Position,
    pub heading: f64,
    pub kind: FlightKind,
    pub callsign: String,
    pub origin_country: String,
    pub destination_country: Option<String>,
    pub altitude_m: i64,
    pub speed_kmh: i64,
}

/// Markers to place plus the one to highlight, if any.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkerSet {
    pub markers: Vec<MarkerView>,
    /// Always refers to a marker in `markers`.
    pub highlighted: Option<FlightId>,
}

/// Contents of the flight detail modal.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: FlightId,
    pub callsign: String,
    pub kind: FlightKind,
    pub origin_country: String,
    pub destination_country: String,
    pub position: Option<Position>,
    pub altitude_m: i64,
    pub speed_kmh: i64,
    pub heading_deg: i64,
    pub trackable: bool,
}

/// Header status: connection indicator and counters.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub connection: ConnectionStatus,
    /// Number of flights passing the filter.
    pub shown: usize,
    /// Count reported by the backend.
    pub reported: Option<usize>,
    pub last_updated: Option<String>,
    pub demo_mode: bool,
}

/// Filter controls state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterView {
    /// Country options in display order with their selection state.
    pub countries: Vec<(String, bool)>,
    pub military_only: bool,
}

/// Everything the presentation layer draws for one state revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub list: ListView,
    pub markers: MarkerSet,
    pub path: Option<FlightPath>,
    pub detail: Option<DetailView>,
    pub status: StatusView,
    pub filters: FilterView,
    pub focused: Option<FlightId>,
}

#[allow(clippy::cast_possible_truncation, reason = "display rounding of altitude and heading")]
fn rounded(value: f64) -> i64 {
    value.round() as i64
}

impl ListItem {
    fn from_flight(flight: &Flight, focused: bool) -> Self {
        Self {
            id: flight.id.clone(),
            callsign: flight.callsign_or_default().to_string(),
            origin_country: flight.origin_country.clone(),
            kind: flight.kind(),
            speed_kmh: flight.speed_kmh(),
            altitude_m: rounded(flight.altitude),
            last_contact: flight.last_contact_or_default().to_string(),
            focused,
        }
    }
}

impl MarkerView {
    fn from_flight(flight: &Flight) -> Option<Self> {
        Some(Self {
            id: flight.id.clone(),
            position: flight.position?,
            heading: flight.heading,
            kind: flight.kind(),
            callsign: flight.callsign_or_default().to_string(),
            origin_country: flight.origin_country.clone(),
            destination_country: flight.destination_country.clone(),
            altitude_m: rounded(flight.altitude),
            speed_kmh: flight.speed_kmh(),
        })
    }
}

impl DetailView {
    fn from_flight(flight: &Flight) -> Self {
        Self {
            id: flight.id.clone(),
            callsign: flight.callsign_or_default().to_string(),
            kind: flight.kind(),
            origin_country: flight.origin_country.clone(),
            destination_country: flight.destination_or_default().to_string(),
            position: flight.position,
            altitude_m: rounded(flight.altitude),
            speed_kmh: flight.speed_kmh(),
            heading_deg: rounded(flight.heading),
            trackable: flight.position.is_some(),
        }
    }
}

/// Resolve a flight by id from the current data, falling back to the
/// focused flight's last known snapshot.
fn resolve<'a>(state: &'a TrackerState, id: &FlightId) -> Option<&'a Flight> {
    state.data.get(id).or(match &state.focus {
        Focus::Focused { id: focused, last_known } if focused == id => Some(last_known),
        _ => None,
    })
}

/// Derive the full presentation frame from tracker state.
#[must_use]
pub fn render(state: &TrackerState, config: &TrackerConfig) -> Frame {
    let limits = config.limits;
    let filtered = state.data.filtered();
    let focused = state.focus.id();

    let list = ListView {
        items: filtered
            .iter()
            .take(limits.list_limit)
            .map(|f| ListItem::from_flight(f, focused == Some(&f.id)))
            .collect(),
        total: filtered.len(),
    };

    let markers: Vec<MarkerView> = filtered
        .iter()
        .take(limits.max_markers)
        .filter_map(|f| MarkerView::from_flight(f))
        .collect();
    let highlighted = focused
        .filter(|id| markers.iter().any(|m| &m.id == *id))
        .cloned();

    let path = focused
        .and_then(|id| resolve(state, id))
        .and_then(|f| project_flight(f, config.projection));

    let detail = state
        .detail
        .as_ref()
        .and_then(|id| resolve(state, id))
        .map(DetailView::from_flight);

    let status = StatusView {
        connection: state.connection,
        shown: filtered.len(),
        reported: state.stats.as_ref().map(|s| s.count),
        last_updated: state.stats.as_ref().map(|s| s.last_updated.clone()),
        demo_mode: state.stats.as_ref().is_some_and(|s| s.demo_mode),
    };

    let filters = FilterView {
        countries: state
            .data
            .countries()
            .iter()
            .map(|c| (c.clone(), state.data.is_country_selected(c)))
            .collect(),
        military_only: state.data.military_only(),
    };

    Frame {
        list,
        markers: MarkerSet {
            markers,
            highlighted,
        },
        path,
        detail,
        status,
        filters,
        focused: focused.cloned(),
    }
}
