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

//! Map surface abstraction.
//!
//! [`MapSurface`] is the seam between tracker state and whatever draws the
//! map. [`MapPresenter`] drives a surface from rendered frames and keeps the
//! overlay rules: at most one projected path and at most one highlighted
//! marker exist at any time.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::flight::{FlightId, Position};
use crate::geometry::FlightPath;
use crate::view::{Frame, MarkerView, DEFAULT_MAX_MARKERS};

/// Map center and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f32,
}

impl Viewport {
    /// Brussels, the initial and "center map" view.
    pub const EUROPE: Viewport = Viewport {
        latitude: 50.8503,
        longitude: 4.3517,
        zoom: 4.0,
    };

    /// New York, the "reset view" target.
    pub const NEW_YORK: Viewport = Viewport {
        latitude: 40.7128,
        longitude: -74.0060,
        zoom: 3.0,
    };

    #[must_use]
    pub fn new(center: Position, zoom: f32) -> Self {
        Self {
            latitude: center.latitude,
            longitude: center.longitude,
            zoom,
        }
    }

    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(self.latitude, self.longitude)
    }
}

/// Operations a map widget must provide.
pub trait MapSurface {
    fn place_marker(&mut self, marker: &MarkerView);
    fn clear_markers(&mut self);
    fn show_path(&mut self, path: &FlightPath);
    fn clear_path(&mut self);
    /// Highlight one marker, or remove the highlight with `None`.
    fn set_highlight(&mut self, id: Option<&FlightId>);
    /// Animate the view to a new center and zoom.
    fn fly_to(&mut self, viewport: Viewport);
}

/// Highlight state for the single highlightable marker.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    Highlighted(FlightId),
}

/// Keeps a [`MapSurface`] in sync with rendered frames.
#[derive(Debug)]
pub struct MapPresenter {
    max_markers: usize,
    placed: Vec<FlightId>,
    path: Option<FlightPath>,
    highlight: Highlight,
}

impl Default for MapPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MARKERS)
    }
}

impl MapPresenter {
    #[must_use]
    pub fn new(max_markers: usize) -> Self {
        Self {
            max_markers,
            placed: Vec::new(),
            path: None,
            highlight: Highlight::None,
        }
    }

    /// Ids of markers currently on the surface, in placement order.
    #[must_use]
    pub fn placed(&self) -> &[FlightId] {
        &self.placed
    }

    #[must_use]
    pub fn path(&self) -> Option<&FlightPath> {
        self.path.as_ref()
    }

    #[must_use]
    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    /// Replace every marker. Markers without a place in the cap are dropped.
    pub fn sync_markers<S: MapSurface>(&mut self, surface: &mut S, markers: &[MarkerView]) {
        surface.clear_markers();
        self.placed.clear();

        for marker in markers.iter().take(self.max_markers) {
            surface.place_marker(marker);
            self.placed.push(marker.id.clone());
        }

        // Old markers are gone, so a highlight on one of them is too
        if let Highlight::Highlighted(id) = &self.highlight {
            if !self.placed.contains(id) {
                self.highlight = Highlight::None;
            }
        }
    }

    /// Show a path, removing any previous one first.
    pub fn show_path<S: MapSurface>(&mut self, surface: &mut S, path: FlightPath) {
        if self.path.take().is_some() {
            surface.clear_path();
        }
        surface.show_path(&path);
        self.path = Some(path);
    }

    pub fn clear_path<S: MapSurface>(&mut self, surface: &mut S) {
        if self.path.take().is_some() {
            surface.clear_path();
        }
    }

    /// Highlight a placed marker, clearing the previous highlight first.
    ///
    /// Returns `false` without touching the surface if the marker is not placed.
    pub fn highlight_marker<S: MapSurface>(&mut self, surface: &mut S, id: &FlightId) -> bool {
        if !self.placed.contains(id) {
            debug!("Cannot highlight {}: marker not on map", id);
            return false;
        }
        if self.highlight == Highlight::Highlighted(id.clone()) {
            return true;
        }

        self.clear_highlight(surface);
        surface.set_highlight(Some(id));
        self.highlight = Highlight::Highlighted(id.clone());
        true
    }

    pub fn clear_highlight<S: MapSurface>(&mut self, surface: &mut S) {
        if self.highlight != Highlight::None {
            surface.set_highlight(None);
            self.highlight = Highlight::None;
        }
    }

    /// Remove every marker and overlay.
    pub fn clear_all<S: MapSurface>(&mut self, surface: &mut S) {
        self.clear_highlight(surface);
        self.clear_path(surface);
        surface.clear_markers();
        self.placed.clear();
    }

    /// Bring the surface in line with a rendered frame.
    pub fn apply<S: MapSurface>(&mut self, surface: &mut S, frame: &Frame) {
        self.sync_markers(surface, &frame.markers.markers);

        match frame.path {
            Some(path) => self.show_path(surface, path),
            None => self.clear_path(surface),
        }

        match &frame.markers.highlighted {
            Some(id) => {
                self.highlight_marker(surface, id);
            }
            None => self.clear_highlight(surface),
        }
    }

    pub fn fly_to<S: MapSurface>(&mut self, surface: &mut S, viewport: Viewport) {
        debug!(
            "Flying to {:.4}, {:.4} at zoom {}",
            viewport.latitude, viewport.longitude, viewport.zoom
        );
        surface.fly_to(viewport);
    }
}
