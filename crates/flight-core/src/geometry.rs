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

//! Projected flight path geometry.
//!
//! Computes where a flight is heading from its current position, heading and
//! speed, and shapes that into a bowed quadratic curve plus an arrowhead for
//! the map overlay. The curve is cosmetic, not a real trajectory.

use serde::{Deserialize, Serialize};

use crate::flight::{Flight, Position};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Legacy scale applied to velocity to get a projection distance.
const LEGACY_DISTANCE_SCALE: f64 = 0.2;

/// Latitude offset added to the curve midpoint so the path bows visibly.
const CONTROL_POINT_LAT_BIAS: f64 = 0.5;

/// Arrowhead half-width and depth in degrees.
const ARROWHEAD_SIZE_DEG: f64 = 0.2;

/// How velocity is turned into a projection distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProjectionMode {
    /// `velocity * 0.2` kilometers, the same as 200 s of travel at m/s.
    #[default]
    Legacy,
    /// Distance actually covered in `horizon_secs` at the reported speed.
    Corrected { horizon_secs: f64 },
}

impl ProjectionMode {
    /// Projection distance in kilometers for a speed in m/s.
    #[must_use]
    pub fn distance_km(self, velocity: f64) -> f64 {
        match self {
            ProjectionMode::Legacy => velocity * LEGACY_DISTANCE_SCALE,
            ProjectionMode::Corrected { horizon_secs } => velocity * horizon_secs / 1000.0,
        }
    }
}

/// Renderable path overlay: a quadratic curve from `start` to `end` through
/// `control`, with an arrowhead triangle at the end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightPath {
    pub start: Position,
    pub control: Position,
    pub end: Position,
    pub arrowhead: [Position; 3],
}

impl FlightPath {
    /// Sample the quadratic curve into `segments + 1` points.
    #[must_use]
    pub fn sample(&self, segments: usize) -> Vec<Position> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| {
                #[allow(clippy::cast_precision_loss, reason = "segment counts are tiny")]
                let t = i as f64 / segments as f64;
                let u = 1.0 - t;
                Position::new(
                    u * u * self.start.latitude
                        + 2.0 * u * t * self.control.latitude
                        + t * t * self.end.latitude,
                    u * u * self.start.longitude
                        + 2.0 * u * t * self.control.longitude
                        + t * t * self.end.longitude,
                )
            })
            .collect()
    }
}

/// Great-circle destination from `start` along `bearing_deg` for `distance_km`.
#[must_use]
pub fn destination_point(start: Position, bearing_deg: f64, distance_km: f64) -> Position {
    let lat1 = start.latitude.to_radians();
    let lon1 = start.longitude.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_km / EARTH_RADIUS_KM;

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Position::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Project a path from a position, heading and velocity.
///
/// Returns `None` when heading or velocity is zero: there is nothing to draw.
#[must_use]
pub fn project_path(
    start: Position,
    heading: f64,
    velocity: f64,
    mode: ProjectionMode,
) -> Option<FlightPath> {
    if heading == 0.0 || velocity == 0.0 || !heading.is_finite() || !velocity.is_finite() {
        return None;
    }

    let end = destination_point(start, heading, mode.distance_km(velocity));
    let control = Position::new(
        start.latitude + (end.latitude - start.latitude) * 0.5 + CONTROL_POINT_LAT_BIAS,
        start.longitude + (end.longitude - start.longitude) * 0.5,
    );
    let arrowhead = [
        end,
        Position::new(end.latitude + ARROWHEAD_SIZE_DEG, end.longitude + ARROWHEAD_SIZE_DEG),
        Position::new(end.latitude + ARROWHEAD_SIZE_DEG, end.longitude - ARROWHEAD_SIZE_DEG),
    ];

    Some(FlightPath {
        start,
        control,
        end,
        arrowhead,
    })
}

/// Project the path for a flight, if it has a position to start from.
#[must_use]
pub fn project_flight(flight: &Flight, mode: ProjectionMode) -> Option<FlightPath> {
    project_path(flight.position?, flight.heading, flight.velocity, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eastward_on_equator() {
        let path = project_path(Position::new(0.0, 0.0), 90.0, 100.0, ProjectionMode::Legacy)
            .unwrap();

        // distance = 20 km, 20 / 6371 rad = 0.17987 degrees
        assert!(path.end.latitude.abs() < 1e-9);
        assert!((path.end.longitude - 0.179_866).abs() < 1e-4);
        assert!(path.end.longitude > 0.0);
    }

    #[test]
    fn test_control_point_bias() {
        let start = Position::new(10.0, 20.0);
        let path = project_path(start, 45.0, 250.0, ProjectionMode::Legacy).unwrap();

        let mid_lat = (start.latitude + path.end.latitude) / 2.0;
        let mid_lon = (start.longitude + path.end.longitude) / 2.0;
        assert!((path.control.latitude - (mid_lat + 0.5)).abs() < 1e-9);
        assert!((path.control.longitude - mid_lon).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_inputs_produce_no_path() {
        let start = Position::new(51.0, 0.0);
        assert!(project_path(start, 0.0, 250.0, ProjectionMode::Legacy).is_none());
        assert!(project_path(start, 90.0, 0.0, ProjectionMode::Legacy).is_none());
        assert!(project_path(start, f64::NAN, 250.0, ProjectionMode::Legacy).is_none());
    }

    #[test]
    fn test_southward_projection() {
        let end = destination_point(Position::new(0.0, 0.0), 180.0, 111.195);
        // One degree of latitude is ~111.195 km on this sphere
        assert!((end.latitude + 1.0).abs() < 1e-3);
        assert!(end.longitude.abs() < 1e-9);
    }

    #[test]
    fn test_corrected_mode_distance() {
        let mode = ProjectionMode::Corrected { horizon_secs: 600.0 };
        // 250 m/s for 10 minutes = 150 km
        assert!((mode.distance_km(250.0) - 150.0).abs() < 1e-9);
        assert!((ProjectionMode::Legacy.distance_km(250.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_arrowhead_anchored_at_end() {
        let path = project_path(Position::new(40.0, -74.0), 30.0, 200.0, ProjectionMode::Legacy)
            .unwrap();
        assert_eq!(path.arrowhead[0], path.end);
        assert!((path.arrowhead[1].latitude - (path.end.latitude + 0.2)).abs() < 1e-9);
        assert!((path.arrowhead[2].longitude - (path.end.longitude - 0.2)).abs() < 1e-9);
    }

    #[test]
    fn test_sample_hits_endpoints() {
        let path = project_path(Position::new(40.0, -74.0), 30.0, 200.0, ProjectionMode::Legacy)
            .unwrap();
        let points = path.sample(16);
        assert_eq!(points.len(), 17);
        assert_eq!(points[0], path.start);
        assert!((points[16].latitude - path.end.latitude).abs() < 1e-9);
        assert!((points[16].longitude - path.end.longitude).abs() < 1e-9);
    }
}
