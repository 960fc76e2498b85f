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

//! Flight tracker state store and message dispatch.
//!
//! [`Tracker`] owns the single authoritative [`TrackerState`]. User
//! interaction and feed results arrive as [`Message`] values through
//! [`Tracker::dispatch`], which mutates state and returns the imperative
//! [`Command`]s (viewport animation, refresh) the host must carry out.
//! Everything else the host draws comes from [`Tracker::render`].
//!
//! Focus state machine:
//!
//! ```text
//! Unfocused  --focus(id), flight exists with position-->  Focused(id)
//! Focused(a) --focus(b), flight exists with position-->  Focused(b)
//! Focused(_) --reset-->                                   Unfocused
//! any        --focus(id), unknown or no position-->       unchanged
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::feed::FeedSnapshot;
use crate::flight::{Flight, FlightId};
use crate::geometry::ProjectionMode;
use crate::manager::{FlightDataManager, DEFAULT_COUNTRIES};
use crate::map::Viewport;
use crate::view::{render, Frame, RenderLimits};

/// Zoom level used when animating to a focused flight.
pub const FOCUS_ZOOM: f32 = 8.0;

/// What happens to focus when the focused flight drops out of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StaleFocusPolicy {
    /// Keep focus on the last known data for the flight.
    #[default]
    Retain,
    /// Drop focus (and its detail view) as soon as the flight disappears.
    Clear,
}

/// Focused flight, with the last data seen for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Focus {
    Unfocused,
    Focused { id: FlightId, last_known: Flight },
}

impl Focus {
    #[must_use]
    pub fn id(&self) -> Option<&FlightId> {
        match self {
            Focus::Unfocused => None,
            Focus::Focused { id, .. } => Some(id),
        }
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        matches!(self, Focus::Focused { .. })
    }
}

/// Feed connection indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Demo,
    Error,
}

impl ConnectionStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "Connecting...",
            ConnectionStatus::Connected => "Live Data",
            ConnectionStatus::Demo => "Demo Mode",
            ConnectionStatus::Error => "Connection Error",
        }
    }
}

/// Counters reported with the last successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedStats {
    pub count: usize,
    pub last_updated: String,
    pub demo_mode: bool,
}

/// Tracker behavior settings.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Country filter options, all selected initially.
    pub countries: Vec<String>,
    pub military_only: bool,
    pub stale_focus: StaleFocusPolicy,
    pub projection: ProjectionMode,
    pub focus_zoom: f32,
    /// Viewport for "center map".
    pub default_view: Viewport,
    /// Viewport for "reset view".
    pub reset_view: Viewport,
    pub limits: RenderLimits,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            countries: DEFAULT_COUNTRIES.iter().map(|c| (*c).to_string()).collect(),
            military_only: false,
            stale_focus: StaleFocusPolicy::default(),
            projection: ProjectionMode::default(),
            focus_zoom: FOCUS_ZOOM,
            default_view: Viewport::EUROPE,
            reset_view: Viewport::NEW_YORK,
            limits: RenderLimits::default(),
        }
    }
}

/// The single authoritative application state.
#[derive(Debug, Clone)]
pub struct TrackerState {
    pub data: FlightDataManager,
    pub focus: Focus,
    /// Flight shown in the detail view.
    pub detail: Option<FlightId>,
    pub connection: ConnectionStatus,
    pub stats: Option<FeedStats>,
}

/// Everything that can change tracker state.
#[derive(Debug, Clone)]
pub enum Message {
    ToggleCountry(String),
    ToggleMilitary,
    ResetView,
    CenterMap,
    Refresh,
    /// Row clicked in the flight list.
    SelectFlight(FlightId),
    /// Marker clicked on the map.
    MarkerClicked(FlightId),
    /// "Track on map" pressed in the detail view.
    TrackFlight(FlightId),
    CloseModal,
    FetchStarted,
    FeedUpdated { generation: u64, snapshot: FeedSnapshot },
    FeedFailed { generation: u64, error: String },
}

/// Side effects the host performs after a dispatch, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    FlyTo(Viewport),
    Refresh,
}

/// Flight tracker orchestrator.
#[derive(Debug)]
pub struct Tracker {
    state: TrackerState,
    config: TrackerConfig,
    last_generation: u64,
    revision: u64,
}

impl Tracker {
    #[must_use]
    pub fn new(config: TrackerConfig) -> Self {
        let mut data = FlightDataManager::new(config.countries.clone());
        data.set_military_only(config.military_only);

        Self {
            state: TrackerState {
                data,
                focus: Focus::Unfocused,
                detail: None,
                connection: ConnectionStatus::Connecting,
                stats: None,
            },
            config,
            last_generation: 0,
            revision: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Bumped on every dispatch; hosts can skip re-syncing unchanged state.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn render(&self) -> Frame {
        render(&self.state, &self.config)
    }

    /// Handle one message. Returned commands must be applied in order.
    pub fn dispatch(&mut self, message: Message) -> Vec<Command> {
        self.revision += 1;

        match message {
            Message::ToggleCountry(country) => {
                let included = self.state.data.toggle_country(&country);
                debug!("Country filter '{}' -> {}", country, included);
                Vec::new()
            }
            Message::ToggleMilitary => {
                let military_only = self.state.data.toggle_military_only();
                debug!("Military-only filter -> {}", military_only);
                Vec::new()
            }
            Message::ResetView => self.reset_view(),
            Message::CenterMap => vec![Command::FlyTo(self.config.default_view)],
            Message::Refresh => vec![Command::Refresh],
            Message::SelectFlight(id) => self.select_flight(&id),
            Message::MarkerClicked(id) => self.focus_on_flight(&id),
            Message::TrackFlight(id) => {
                let commands = self.focus_on_flight(&id);
                self.state.detail = None;
                commands
            }
            Message::CloseModal => {
                self.state.detail = None;
                Vec::new()
            }
            Message::FetchStarted => {
                self.state.connection = ConnectionStatus::Connecting;
                Vec::new()
            }
            Message::FeedUpdated { generation, snapshot } => {
                self.apply_snapshot(generation, snapshot);
                Vec::new()
            }
            Message::FeedFailed { generation, error } => {
                warn!("Flight feed refresh {} failed: {}", generation, error);
                self.state.connection = ConnectionStatus::Error;
                Vec::new()
            }
        }
    }

    /// Focus a flight and open its detail view.
    ///
    /// Silently does nothing if the flight is unknown or has no position.
    pub fn focus_on_flight(&mut self, id: &FlightId) -> Vec<Command> {
        let Some(flight) = self.state.data.get(id) else {
            debug!("Ignoring focus request for unknown flight {}", id);
            return Vec::new();
        };
        let Some(position) = flight.position else {
            debug!("Ignoring focus request for flight {} without position", id);
            return Vec::new();
        };

        info!("Tracking flight {} ({})", flight.callsign_or_default(), id);
        self.state.focus = Focus::Focused {
            id: id.clone(),
            last_known: flight.clone(),
        };
        self.state.detail = Some(id.clone());

        vec![Command::FlyTo(Viewport::new(position, self.config.focus_zoom))]
    }

    /// Clear focus and return to the reset viewport.
    pub fn reset_view(&mut self) -> Vec<Command> {
        if let Focus::Focused { id, .. } = &self.state.focus {
            info!("Releasing focus on flight {}", id);
        }
        self.state.focus = Focus::Unfocused;
        vec![Command::FlyTo(self.config.reset_view)]
    }

    /// Open the detail view only. Focus and viewport stay as they are.
    fn select_flight(&mut self, id: &FlightId) -> Vec<Command> {
        if self.state.data.get(id).is_some() {
            self.state.detail = Some(id.clone());
        } else {
            debug!("Ignoring selection of unknown flight {}", id);
        }
        Vec::new()
    }

    fn apply_snapshot(&mut self, generation: u64, snapshot: FeedSnapshot) {
        if generation < self.last_generation {
            warn!(
                "Discarding out-of-order feed refresh {} (already applied {})",
                generation, self.last_generation
            );
            return;
        }
        self.last_generation = generation;

        self.state.data.ingest(&snapshot.flights);
        self.state.connection = if snapshot.demo_mode {
            ConnectionStatus::Demo
        } else {
            ConnectionStatus::Connected
        };
        self.state.stats = Some(FeedStats {
            count: snapshot.count,
            last_updated: snapshot.last_updated,
            demo_mode: snapshot.demo_mode,
        });

        self.reconcile_focus();
        debug!(
            "Applied feed refresh {}: {} flights, {} shown",
            generation,
            self.state.data.len(),
            self.state.data.filtered().len()
        );
    }

    /// Bring focus and detail view in line with a freshly ingested flight set.
    fn reconcile_focus(&mut self) {
        if let Focus::Focused { id, last_known } = &mut self.state.focus {
            if let Some(current) = self.state.data.get(id) {
                *last_known = current.clone();
            } else if self.config.stale_focus == StaleFocusPolicy::Clear {
                info!("Focused flight {} left the feed, clearing focus", id);
                self.state.focus = Focus::Unfocused;
            }
        }

        let detail_resolvable = self.state.detail.as_ref().is_some_and(|id| {
            self.state.data.get(id).is_some() || self.state.focus.id() == Some(id)
        });
        if !detail_resolvable {
            self.state.detail = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(id: &str, callsign: &str, lat: Option<f64>) -> Value {
        let mut value = json!({
            "icao24": id,
            "callsign": callsign,
            "origin_country": "United States",
            "altitude": 9000,
            "velocity": 220,
            "heading": 45
        });
        if let Some(lat) = lat {
            value["latitude"] = json!(lat);
            value["longitude"] = json!(-100.0);
        }
        value
    }

    fn snapshot(records: Vec<Value>, demo_mode: bool) -> FeedSnapshot {
        FeedSnapshot {
            count: records.len(),
            flights: records,
            last_updated: "09:30:00".to_string(),
            demo_mode,
        }
    }

    fn loaded_tracker(config: TrackerConfig) -> Tracker {
        let mut tracker = Tracker::new(config);
        tracker.dispatch(Message::FeedUpdated {
            generation: 1,
            snapshot: snapshot(
                vec![
                    record("a1", "AF100", Some(40.0)),
                    record("b2", "N555", Some(41.0)),
                    record("c3", "GXYZ12", None),
                ],
                false,
            ),
        });
        tracker
    }

    #[test]
    fn test_focus_transitions() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        assert_eq!(tracker.state().focus, Focus::Unfocused);

        let commands = tracker.dispatch(Message::MarkerClicked(FlightId::from("a1")));
        assert_eq!(tracker.state().focus.id(), Some(&FlightId::from("a1")));
        assert_eq!(
            commands,
            vec![Command::FlyTo(Viewport::new(
                crate::flight::Position::new(40.0, -100.0),
                FOCUS_ZOOM
            ))]
        );

        tracker.dispatch(Message::MarkerClicked(FlightId::from("b2")));
        assert_eq!(tracker.state().focus.id(), Some(&FlightId::from("b2")));

        let commands = tracker.dispatch(Message::ResetView);
        assert_eq!(tracker.state().focus, Focus::Unfocused);
        assert_eq!(commands, vec![Command::FlyTo(Viewport::NEW_YORK)]);
        assert!(tracker.render().path.is_none());
    }

    #[test]
    fn test_focus_on_unknown_or_unmapped_is_noop() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        tracker.dispatch(Message::MarkerClicked(FlightId::from("a1")));
        let before = tracker.state().focus.clone();

        assert!(tracker.focus_on_flight(&FlightId::from("missing")).is_empty());
        assert_eq!(tracker.state().focus, before);

        assert!(tracker.focus_on_flight(&FlightId::from("c3")).is_empty());
        assert_eq!(tracker.state().focus, before);
    }

    #[test]
    fn test_select_unmapped_flight_shows_details_only() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        let commands = tracker.dispatch(Message::SelectFlight(FlightId::from("c3")));

        assert!(commands.is_empty());
        assert_eq!(tracker.state().focus, Focus::Unfocused);
        let detail = tracker.render().detail.unwrap();
        assert_eq!(detail.id.as_str(), "c3");
        assert!(!detail.trackable);
    }

    #[test]
    fn test_track_flight_closes_detail() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        let commands = tracker.dispatch(Message::SelectFlight(FlightId::from("a1")));
        assert!(commands.is_empty());
        assert_eq!(tracker.state().focus, Focus::Unfocused);
        let frame = tracker.render();
        assert_eq!(frame.detail.map(|d| d.id), Some(FlightId::from("a1")));
        assert!(frame.path.is_none());
        assert!(frame.markers.highlighted.is_none());

        tracker.dispatch(Message::TrackFlight(FlightId::from("a1")));
        assert_eq!(tracker.state().focus.id(), Some(&FlightId::from("a1")));
        assert!(tracker.state().detail.is_none());
    }

    #[test]
    fn test_select_keeps_existing_focus() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        tracker.dispatch(Message::MarkerClicked(FlightId::from("a1")));

        let commands = tracker.dispatch(Message::SelectFlight(FlightId::from("b2")));
        assert!(commands.is_empty());
        assert_eq!(tracker.state().focus.id(), Some(&FlightId::from("a1")));
        assert_eq!(tracker.state().detail, Some(FlightId::from("b2")));

        assert!(tracker.dispatch(Message::SelectFlight(FlightId::from("missing"))).is_empty());
        assert_eq!(tracker.state().detail, Some(FlightId::from("b2")));
    }

    #[test]
    fn test_failed_fetch_leaves_data_untouched() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        let flights_before = tracker.state().data.flights().to_vec();
        let filtered_before: Vec<Flight> =
            tracker.state().data.filtered().into_iter().cloned().collect();

        tracker.dispatch(Message::FetchStarted);
        tracker.dispatch(Message::FeedFailed {
            generation: 2,
            error: "timeout".to_string(),
        });

        assert_eq!(tracker.state().connection, ConnectionStatus::Error);
        assert_eq!(tracker.state().data.flights(), flights_before.as_slice());
        let filtered_after: Vec<Flight> =
            tracker.state().data.filtered().into_iter().cloned().collect();
        assert_eq!(filtered_after, filtered_before);
    }

    #[test]
    fn test_connection_status_follows_demo_flag() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        assert_eq!(tracker.state().connection, ConnectionStatus::Connected);

        tracker.dispatch(Message::FeedUpdated {
            generation: 2,
            snapshot: snapshot(vec![record("a1", "AF100", Some(40.0))], true),
        });
        assert_eq!(tracker.state().connection, ConnectionStatus::Demo);
        assert!(tracker.render().status.demo_mode);
    }

    #[test]
    fn test_out_of_order_refresh_discarded() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        tracker.dispatch(Message::FeedUpdated {
            generation: 5,
            snapshot: snapshot(vec![record("new", "AF1", Some(1.0))], false),
        });
        tracker.dispatch(Message::FeedUpdated {
            generation: 3,
            snapshot: snapshot(vec![record("old", "AF2", Some(2.0))], false),
        });

        assert!(tracker.state().data.get(&FlightId::from("new")).is_some());
        assert!(tracker.state().data.get(&FlightId::from("old")).is_none());
    }

    #[test]
    fn test_stale_focus_retained_by_default() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        tracker.dispatch(Message::MarkerClicked(FlightId::from("a1")));
        tracker.dispatch(Message::FeedUpdated {
            generation: 2,
            snapshot: snapshot(vec![record("b2", "N555", Some(41.0))], false),
        });

        assert_eq!(tracker.state().focus.id(), Some(&FlightId::from("a1")));
        let frame = tracker.render();
        assert!(frame.path.is_some());
        assert_eq!(frame.markers.highlighted, None);
        assert_eq!(frame.detail.map(|d| d.id), Some(FlightId::from("a1")));
    }

    #[test]
    fn test_stale_focus_cleared_when_configured() {
        let mut tracker = loaded_tracker(TrackerConfig {
            stale_focus: StaleFocusPolicy::Clear,
            ..TrackerConfig::default()
        });
        tracker.dispatch(Message::MarkerClicked(FlightId::from("a1")));
        tracker.dispatch(Message::FeedUpdated {
            generation: 2,
            snapshot: snapshot(vec![record("b2", "N555", Some(41.0))], false),
        });

        assert_eq!(tracker.state().focus, Focus::Unfocused);
        assert!(tracker.state().detail.is_none());
        assert!(tracker.render().path.is_none());
    }

    #[test]
    fn test_focus_snapshot_refreshed_on_update() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        tracker.dispatch(Message::MarkerClicked(FlightId::from("a1")));
        tracker.dispatch(Message::FeedUpdated {
            generation: 2,
            snapshot: snapshot(vec![record("a1", "AF100", Some(45.0))], false),
        });

        match &tracker.state().focus {
            Focus::Focused { last_known, .. } => {
                assert_eq!(last_known.position.map(|p| p.latitude), Some(45.0));
            }
            Focus::Unfocused => panic!("focus should be retained"),
        }
    }

    #[test]
    fn test_refresh_and_center_commands() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        tracker.dispatch(Message::MarkerClicked(FlightId::from("a1")));

        assert_eq!(tracker.dispatch(Message::Refresh), vec![Command::Refresh]);
        assert_eq!(
            tracker.dispatch(Message::CenterMap),
            vec![Command::FlyTo(Viewport::EUROPE)]
        );
        // Centering the map keeps focus
        assert!(tracker.state().focus.is_focused());
    }

    #[test]
    fn test_filter_messages() {
        let mut tracker = loaded_tracker(TrackerConfig::default());
        assert_eq!(tracker.render().list.total, 3);

        tracker.dispatch(Message::ToggleMilitary);
        assert_eq!(tracker.render().list.total, 1);

        tracker.dispatch(Message::ToggleMilitary);
        tracker.dispatch(Message::ToggleCountry("United States".to_string()));
        assert_eq!(tracker.render().list.total, 0);
    }
}
