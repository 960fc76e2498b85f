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

//! Application configuration management.
//!
//! Persistent settings are stored in TOML via `confy`. Every field has a
//! serde default so older or hand-edited files keep loading.

use std::time::Duration;

use flight_core::manager::DEFAULT_COUNTRIES;
use flight_core::view::{DEFAULT_LIST_LIMIT, DEFAULT_MAX_MARKERS};
use flight_core::{PollerConfig, ProjectionMode, RenderLimits, StaleFocusPolicy, TrackerConfig, Viewport};
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "flight-tracker";
const CONFIG_NAME: &str = "config";

/// Default backend endpoint serving the flight feed
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/flights";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Flight feed URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Use generated demo data instead of the backend
    #[serde(default)]
    pub demo: bool,

    /// Seconds between feed refreshes
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum markers drawn on the map
    #[serde(default = "default_max_markers")]
    pub max_markers: usize,

    /// Maximum rows in the flight list
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,

    /// Country filter options, all selected at startup
    #[serde(default = "default_countries")]
    pub countries: Vec<String>,

    /// Start with the military-only filter on
    #[serde(default)]
    pub military_only: bool,

    /// Initial and "center map" view
    #[serde(default = "default_view")]
    pub default_view: Viewport,

    /// "Reset view" target
    #[serde(default = "default_reset_view")]
    pub reset_view: Viewport,

    /// What to do when the focused flight leaves the feed
    #[serde(default)]
    pub stale_focus: StaleFocusPolicy,

    /// How far ahead the projected path reaches
    #[serde(default)]
    pub projection: ProjectionMode,

    /// Show the welcome popup at startup
    #[serde(default = "default_true")]
    pub show_welcome: bool,

    /// Flight list panel width in pixels
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width: f32,
}

// Default value functions for serde
fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_poll_interval() -> u64 {
    30
}

fn default_max_markers() -> usize {
    DEFAULT_MAX_MARKERS
}

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

fn default_countries() -> Vec<String> {
    DEFAULT_COUNTRIES.iter().map(|c| (*c).to_string()).collect()
}

fn default_view() -> Viewport {
    Viewport::EUROPE
}

fn default_reset_view() -> Viewport {
    Viewport::NEW_YORK
}

fn default_true() -> bool {
    true
}

fn default_sidebar_width() -> f32 {
    350.0
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            demo: false,
            poll_interval_secs: default_poll_interval(),
            max_markers: default_max_markers(),
            list_limit: default_list_limit(),
            countries: default_countries(),
            military_only: false,
            default_view: default_view(),
            reset_view: default_reset_view(),
            stale_focus: StaleFocusPolicy::default(),
            projection: ProjectionMode::default(),
            show_welcome: true,
            sidebar_width: default_sidebar_width(),
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, creating it with defaults if missing
    pub fn load() -> Result<Self, confy::ConfyError> {
        confy::load(APP_NAME, CONFIG_NAME)
    }

    /// Load configuration, falling back to defaults on any error
    #[must_use]
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    #[must_use]
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            countries: self.countries.clone(),
            military_only: self.military_only,
            stale_focus: self.stale_focus,
            projection: self.projection,
            default_view: self.default_view,
            reset_view: self.reset_view,
            limits: RenderLimits {
                list_limit: self.list_limit,
                max_markers: self.max_markers,
            },
            ..TrackerConfig::default()
        }
    }

    #[must_use]
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            // A zero interval would spin the poll loop
            interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            ..PollerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.endpoint, "http://localhost:5000/api/flights");
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.max_markers, 500);
        assert_eq!(config.list_limit, 50);
        assert_eq!(config.countries.len(), 12);
        assert_eq!(config.default_view, Viewport::EUROPE);
        assert_eq!(config.reset_view, Viewport::NEW_YORK);
        assert!(config.show_welcome);
    }

    #[test]
    fn test_tracker_config_carries_settings() {
        let config = AppConfig {
            max_markers: 10,
            list_limit: 5,
            military_only: true,
            stale_focus: StaleFocusPolicy::Clear,
            ..AppConfig::default()
        };
        let tracker = config.tracker_config();

        assert_eq!(tracker.limits.max_markers, 10);
        assert_eq!(tracker.limits.list_limit, 5);
        assert!(tracker.military_only);
        assert_eq!(tracker.stale_focus, StaleFocusPolicy::Clear);
        assert!((tracker.focus_zoom - 8.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_poller_interval_never_zero() {
        let config = AppConfig {
            poll_interval_secs: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.poller_config().interval, Duration::from_secs(1));
        assert_eq!(
            AppConfig::default().poller_config().interval,
            Duration::from_secs(30)
        );
    }
}
