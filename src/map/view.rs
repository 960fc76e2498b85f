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

//! Slippy map widget.
//!
//! [`MapView`] is the egui implementation of [`MapSurface`]: the presenter
//! pushes markers, the path overlay and the highlight into it, and
//! [`MapView::show`] paints them over OpenStreetMap tiles each frame.

use std::time::{Duration, Instant};

use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, StrokeKind};
use flight_core::geometry::FlightPath;
use flight_core::map::{MapSurface, Viewport};
use flight_core::view::MarkerView;
use flight_core::{FlightId, Position};

use super::tiles::{TileManager, WebMercator, TILE_SIZE};
use crate::ui::style;

const MIN_ZOOM: f32 = 2.0;
const MAX_ZOOM: f32 = 10.0;
const FLY_DURATION: Duration = Duration::from_millis(1500);
const MARKER_RADIUS: f32 = 7.0;
const HIGHLIGHT_SCALE: f32 = 1.5;
const CLICK_RADIUS: f32 = 10.0;
const PATH_SEGMENTS: usize = 32;

/// In-progress viewport animation.
#[derive(Debug, Clone, Copy)]
struct FlyAnimation {
    from: Viewport,
    to: Viewport,
    started: Instant,
}

impl FlyAnimation {
    /// Viewport at `now`, and whether the animation has finished.
    fn at(&self, now: Instant) -> (Viewport, bool) {
        let t = (now.duration_since(self.started).as_secs_f64() / FLY_DURATION.as_secs_f64())
            .clamp(0.0, 1.0);
        // Smoothstep easing
        let eased = t * t * (3.0 - 2.0 * t);
        if t >= 1.0 {
            return (self.to, true);
        }
        let lerp = |a: f64, b: f64| a + (b - a) * eased;

        // Take the short way around, which may cross the antimeridian
        let lon_delta = wrap_longitude(self.to.longitude - self.from.longitude);

        #[allow(clippy::cast_possible_truncation, reason = "zoom levels are small")]
        let viewport = Viewport {
            latitude: lerp(self.from.latitude, self.to.latitude),
            longitude: wrap_longitude(self.from.longitude + lon_delta * eased),
            zoom: lerp(f64::from(self.from.zoom), f64::from(self.to.zoom)) as f32,
        };
        (viewport, false)
    }
}

/// Normalize a longitude into [-180, 180).
fn wrap_longitude(longitude: f64) -> f64 {
    (longitude + 180.0).rem_euclid(360.0) - 180.0
}

#[derive(Debug)]
pub struct MapView {
    tile_manager: TileManager,
    viewport: Viewport,
    animation: Option<FlyAnimation>,
    markers: Vec<MarkerView>,
    path: Option<FlightPath>,
    highlighted: Option<FlightId>,
    tile_error: Option<String>,
}

impl MapSurface for MapView {
    fn place_marker(&mut self, marker: &MarkerView) {
        self.markers.push(marker.clone());
    }

    fn clear_markers(&mut self) {
        self.markers.clear();
    }

    fn show_path(&mut self, path: &FlightPath) {
        self.path = Some(*path);
    }

    fn clear_path(&mut self) {
        self.path = None;
    }

    fn set_highlight(&mut self, id: Option<&FlightId>) {
        self.highlighted = id.cloned();
    }

    fn fly_to(&mut self, viewport: Viewport) {
        self.animation = Some(FlyAnimation {
            from: self.viewport,
            to: Viewport {
                zoom: viewport.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
                ..viewport
            },
            started: Instant::now(),
        });
    }
}

impl MapView {
    #[must_use]
    pub fn new(initial: Viewport) -> Self {
        Self {
            tile_manager: TileManager::new(),
            viewport: initial,
            animation: None,
            markers: Vec::new(),
            path: None,
            highlighted: None,
            tile_error: None,
        }
    }

    /// Draw the map. Returns the id of a marker clicked this frame.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "screen-space math on bounded map coordinates"
    )]
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<FlightId> {
        self.advance_animation(ui.ctx());

        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), ui.available_height()),
            Sense::click_and_drag(),
        );
        let rect = response.rect;
        let center = rect.center();

        painter.rect_filled(rect, 0.0, Color32::from_rgb(170, 211, 223));

        // Pinch or ctrl+scroll, plus plain scroll while hovered
        let zoom_delta = ui.ctx().input(egui::InputState::zoom_delta);
        let scroll = if response.hovered() {
            ui.ctx().input(|i| i.smooth_scroll_delta.y)
        } else {
            0.0
        };
        if (zoom_delta - 1.0).abs() > 0.001 || scroll.abs() > 0.1 {
            self.animation = None;
            self.viewport.zoom =
                (self.viewport.zoom + zoom_delta.log2() + scroll / 200.0).clamp(MIN_ZOOM, MAX_ZOOM);
        }

        let tile_zoom_level = self.viewport.zoom.round() as u8;

        let visible_tiles = self.tile_manager.get_visible_tiles(
            self.viewport.latitude,
            self.viewport.longitude,
            tile_zoom_level,
            rect.width(),
            rect.height(),
        );

        let mut tiles_rendered = 0;
        for (tile_coord, offset_x, offset_y) in visible_tiles {
            if let Some(texture) = self.tile_manager.get_tile(tile_coord, ui.ctx()) {
                let tile_rect = Rect::from_min_size(
                    egui::pos2(center.x + offset_x, center.y + offset_y),
                    egui::vec2(TILE_SIZE, TILE_SIZE),
                );
                painter.image(
                    texture.id(),
                    tile_rect,
                    Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
                tiles_rendered += 1;
            }
        }

        if self.tile_manager.get_error_count() > 0 {
            self.tile_error = Some(format!(
                "Failed to load {} tiles",
                self.tile_manager.get_error_count()
            ));
        } else if self.tile_manager.has_loading_tiles() {
            self.tile_error = Some("Loading map tiles...".to_string());
        } else if tiles_rendered > 0 {
            self.tile_error = None;
        }

        if response.dragged() {
            self.animation = None;
            let delta = response.drag_delta();

            // Pixel movement to lat/lon change at the current zoom
            let scale = 2.0_f64.powi(i32::from(tile_zoom_level));
            let lat_per_pixel = 180.0 / (f64::from(TILE_SIZE) * scale);
            let lon_per_pixel = 360.0 / (f64::from(TILE_SIZE) * scale);
            let cos_lat = self.viewport.latitude.to_radians().cos();

            self.viewport.latitude += f64::from(delta.y) * lat_per_pixel;
            self.viewport.longitude -= f64::from(delta.x) * lon_per_pixel / cos_lat.max(0.1);
            self.viewport.latitude = self.viewport.latitude.clamp(-85.0, 85.0);
            self.viewport.longitude = (self.viewport.longitude + 540.0).rem_euclid(360.0) - 180.0;
        }

        let view_center = self.viewport;
        let to_screen = |position: Position| -> Pos2 {
            let tile_x = WebMercator::lon_to_x(position.longitude, tile_zoom_level);
            let tile_y = WebMercator::lat_to_y(position.latitude, tile_zoom_level);
            let center_tile_x = WebMercator::lon_to_x(view_center.longitude, tile_zoom_level);
            let center_tile_y = WebMercator::lat_to_y(view_center.latitude, tile_zoom_level);

            egui::pos2(
                center.x + ((tile_x - center_tile_x) * f64::from(TILE_SIZE)) as f32,
                center.y + ((tile_y - center_tile_y) * f64::from(TILE_SIZE)) as f32,
            )
        };

        if let Some(path) = &self.path {
            Self::draw_path(&painter, path, &to_screen);
        }

        // Highlighted marker last so it sits on top
        let (highlighted, regular): (Vec<&MarkerView>, Vec<&MarkerView>) = self
            .markers
            .iter()
            .partition(|m| self.highlighted.as_ref() == Some(&m.id));
        for marker in regular.iter().chain(highlighted.iter()) {
            let pos = to_screen(marker.position);
            if rect.expand(MARKER_RADIUS * 2.0).contains(pos) {
                let is_highlighted = self.highlighted.as_ref() == Some(&marker.id);
                Self::draw_marker(&painter, marker, pos, is_highlighted);
            }
        }

        let pointer = response.hover_pos();
        let nearest = |at: Pos2| {
            self.markers
                .iter()
                .map(|m| (m, to_screen(m.position).distance(at)))
                .filter(|(_, d)| *d <= CLICK_RADIUS)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(m, _)| m)
        };

        if let Some(marker) = highlighted.first() {
            Self::draw_popup(&painter, marker, to_screen(marker.position));
        }
        if let Some(marker) = pointer.and_then(&nearest) {
            if highlighted.first().map(|h| &h.id) != Some(&marker.id) {
                Self::draw_popup(&painter, marker, to_screen(marker.position));
            }
        }

        let clicked = if response.clicked() {
            response
                .interact_pointer_pos()
                .and_then(&nearest)
                .map(|m| m.id.clone())
        } else {
            None
        };

        self.draw_overlays(&painter, rect);
        clicked
    }

    fn advance_animation(&mut self, ctx: &egui::Context) {
        if let Some(animation) = self.animation {
            let (viewport, finished) = animation.at(Instant::now());
            self.viewport = viewport;
            if finished {
                self.animation = None;
            } else {
                ctx.request_repaint();
            }
        }
    }

    fn draw_path(painter: &egui::Painter, path: &FlightPath, to_screen: &impl Fn(Position) -> Pos2) {
        let color = style::PATH.gamma_multiply(0.7);
        let points: Vec<Pos2> = path.sample(PATH_SEGMENTS).into_iter().map(to_screen).collect();
        painter.extend(Shape::dashed_line(&points, Stroke::new(3.0, color), 10.0, 10.0));

        let arrowhead: Vec<Pos2> = path.arrowhead.iter().copied().map(to_screen).collect();
        painter.add(Shape::convex_polygon(arrowhead, color, Stroke::new(1.0, style::PATH)));
    }

    fn draw_marker(painter: &egui::Painter, marker: &MarkerView, pos: Pos2, highlighted: bool) {
        let color = style::kind_color(marker.kind);
        let radius = if highlighted {
            MARKER_RADIUS * HIGHLIGHT_SCALE
        } else {
            MARKER_RADIUS
        };

        if highlighted {
            painter.circle_filled(pos, radius + 6.0, color.gamma_multiply(0.3));
            painter.circle_stroke(pos, radius + 3.0, Stroke::new(2.0, Color32::WHITE));
        }

        // Plane silhouette pointing along the heading
        #[allow(clippy::cast_possible_truncation, reason = "heading is 0-360 degrees")]
        let angle = marker.heading.to_radians() as f32;
        let rotate = |x: f32, y: f32| {
            let (sin, cos) = angle.sin_cos();
            pos + egui::vec2(x * cos - y * sin, x * sin + y * cos)
        };
        let outline = vec![
            rotate(0.0, -radius),
            rotate(radius * 0.7, radius * 0.8),
            rotate(0.0, radius * 0.4),
            rotate(-radius * 0.7, radius * 0.8),
        ];
        painter.add(Shape::convex_polygon(
            outline,
            color,
            Stroke::new(1.0, Color32::from_black_alpha(160)),
        ));
    }

    fn draw_popup(painter: &egui::Painter, marker: &MarkerView, pos: Pos2) {
        let mut lines = vec![(marker.callsign.clone(), FontId::proportional(13.0), Color32::WHITE)];
        lines.push((format!("From: {}", marker.origin_country), FontId::proportional(11.0), Color32::LIGHT_GRAY));
        if let Some(destination) = &marker.destination_country {
            lines.push((format!("To: {destination}"), FontId::proportional(11.0), Color32::LIGHT_GRAY));
        }
        lines.push((format!("Altitude: {} m", marker.altitude_m), FontId::proportional(11.0), Color32::LIGHT_GRAY));
        lines.push((format!("Speed: {} km/h", marker.speed_kmh), FontId::proportional(11.0), Color32::LIGHT_GRAY));
        lines.push((marker.kind.label().to_string(), FontId::proportional(11.0), style::kind_color(marker.kind)));

        let galleys: Vec<_> = lines
            .into_iter()
            .map(|(text, font, color)| painter.layout_no_wrap(text, font, color))
            .collect();
        let width = galleys.iter().map(|g| g.size().x).fold(0.0, f32::max);
        let height: f32 = galleys.iter().map(|g| g.size().y).sum();

        let padding = egui::vec2(8.0, 6.0);
        let box_rect = Rect::from_min_size(
            pos + egui::vec2(14.0, -height / 2.0 - padding.y),
            egui::vec2(width, height) + padding * 2.0,
        );
        painter.rect_filled(box_rect, 4.0, style::LABEL_BACKGROUND);
        painter.rect_stroke(box_rect, 4.0, Stroke::new(1.0, style::kind_color(marker.kind)), StrokeKind::Inside);

        let mut cursor = box_rect.min + padding;
        for galley in galleys {
            let line_height = galley.size().y;
            painter.galley(cursor, galley, Color32::WHITE);
            cursor.y += line_height;
        }
    }

    fn draw_overlays(&self, painter: &egui::Painter, rect: Rect) {
        painter.text(
            rect.left_top() + egui::vec2(10.0, 10.0),
            Align2::LEFT_TOP,
            "Drag to pan | Scroll to zoom",
            FontId::proportional(12.0),
            Color32::BLACK,
        );

        // Legend
        let legend_origin = rect.left_bottom() + egui::vec2(16.0, -40.0);
        for (i, (label, color)) in [("Military", style::MILITARY), ("Private", style::PRIVATE)]
            .into_iter()
            .enumerate()
        {
            #[allow(clippy::cast_precision_loss, reason = "two legend rows")]
            let row = legend_origin + egui::vec2(0.0, i as f32 * 16.0);
            painter.circle_filled(row, 5.0, color);
            painter.text(
                row + egui::vec2(10.0, 0.0),
                Align2::LEFT_CENTER,
                label,
                FontId::proportional(11.0),
                Color32::BLACK,
            );
        }

        // Attribution (required by OpenStreetMap)
        painter.text(
            rect.right_bottom() + egui::vec2(-10.0, -10.0),
            Align2::RIGHT_BOTTOM,
            "© OpenStreetMap contributors",
            FontId::proportional(10.0),
            Color32::from_black_alpha(180),
        );

        if let Some(error_msg) = &self.tile_error {
            let bg_color = if error_msg.starts_with("Failed") {
                Color32::from_rgb(220, 50, 50)
            } else {
                Color32::from_rgb(255, 200, 100)
            };

            let error_pos = rect.center_top() + egui::vec2(0.0, 20.0);
            let text_galley = painter.layout_no_wrap(
                error_msg.clone(),
                FontId::proportional(12.0),
                Color32::WHITE,
            );
            let padding = egui::vec2(12.0, 6.0);
            let bubble_rect = Rect::from_center_size(error_pos, text_galley.size() + padding * 2.0);

            painter.rect_filled(bubble_rect, 5.0, bg_color);
            painter.text(
                error_pos,
                Align2::CENTER_CENTER,
                error_msg,
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_animation_reaches_target() {
        let start = Instant::now();
        let animation = FlyAnimation {
            from: Viewport::EUROPE,
            to: Viewport::NEW_YORK,
            started: start,
        };

        let (first, done) = animation.at(start);
        assert!(!done);
        assert!((first.latitude - Viewport::EUROPE.latitude).abs() < 1e-9);

        let (last, done) = animation.at(start + FLY_DURATION);
        assert!(done);
        assert!((last.longitude - Viewport::NEW_YORK.longitude).abs() < 1e-9);
        assert!((last.zoom - Viewport::NEW_YORK.zoom).abs() < f32::EPSILON);
    }

    #[test]
    fn test_animation_crosses_antimeridian() {
        let start = Instant::now();
        let animation = FlyAnimation {
            from: Viewport {
                latitude: 0.0,
                longitude: 170.0,
                zoom: 4.0,
            },
            to: Viewport {
                latitude: 0.0,
                longitude: -170.0,
                zoom: 4.0,
            },
            started: start,
        };

        let (mid, done) = animation.at(start + FLY_DURATION / 2);
        assert!(!done);
        assert!((mid.longitude.abs() - 180.0).abs() < 1e-9);

        let (quarter, _) = animation.at(start + FLY_DURATION / 4);
        assert!(quarter.longitude > 170.0);

        let (last, done) = animation.at(start + FLY_DURATION);
        assert!(done);
        assert!((last.longitude + 170.0).abs() < 1e-9);
    }
}
