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

//! Filter controls and the flight list.

use egui::{Color32, RichText};
use flight_core::view::{FilterView, ListItem, ListView};
use flight_core::{FlightKind, Message};

use super::style;

/// Draw the sidebar and collect the messages raised by the user.
pub fn show(ui: &mut egui::Ui, filters: &FilterView, list: &ListView) -> Vec<Message> {
    let mut messages = Vec::new();

    draw_filters(ui, filters, &mut messages);
    ui.separator();
    draw_view_controls(ui, &mut messages);
    ui.separator();
    draw_flight_list(ui, list, &mut messages);

    messages
}

fn draw_filters(ui: &mut egui::Ui, filters: &FilterView, messages: &mut Vec<Message>) {
    ui.label(RichText::new("COUNTRIES").color(style::TEXT_DIM).size(11.0).strong());
    ui.horizontal_wrapped(|ui| {
        for (country, selected) in &filters.countries {
            if ui.selectable_label(*selected, country).clicked() {
                messages.push(Message::ToggleCountry(country.clone()));
            }
        }
    });

    ui.add_space(4.0);
    let label = RichText::new("🛡 Military only").color(if filters.military_only {
        style::MILITARY
    } else {
        Color32::LIGHT_GRAY
    });
    if ui.selectable_label(filters.military_only, label).clicked() {
        messages.push(Message::ToggleMilitary);
    }
}

fn draw_view_controls(ui: &mut egui::Ui, messages: &mut Vec<Message>) {
    ui.horizontal(|ui| {
        if ui.button("⊕ Center map").clicked() {
            messages.push(Message::CenterMap);
        }
        if ui.button("⟲ Reset view").clicked() {
            messages.push(Message::ResetView);
        }
        if ui.button("↻ Refresh").clicked() {
            messages.push(Message::Refresh);
        }
    });
}

fn draw_flight_list(ui: &mut egui::Ui, list: &ListView, messages: &mut Vec<Message>) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("◈ FLIGHTS").color(style::PRIVATE).size(14.0).strong());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("TOTAL: {}", list.total))
                    .color(style::TEXT_DIM)
                    .size(10.0)
                    .monospace(),
            );
        });
    });
    ui.add_space(4.0);

    if list.is_empty() {
        ui.label(RichText::new("No flights in selected countries").color(style::TEXT_DIM));
        return;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.push_id("flight_list", |ui| {
            for item in &list.items {
                if draw_list_item(ui, item) {
                    messages.push(Message::SelectFlight(item.id.clone()));
                }
                ui.add_space(3.0);
            }

            if list.total > list.items.len() {
                ui.label(
                    RichText::new(format!("Showing {} of {}", list.items.len(), list.total))
                        .color(style::TEXT_DIM)
                        .size(10.0),
                );
            }
        });
    });
}

/// Draw one row. Returns true when it was clicked.
fn draw_list_item(ui: &mut egui::Ui, item: &ListItem) -> bool {
    let kind_color = style::kind_color(item.kind);
    let frame = if item.focused {
        egui::Frame::group(ui.style()).fill(style::FOCUSED_ROW)
    } else {
        egui::Frame::group(ui.style())
    };

    let response = frame.show(ui, |ui| {
        ui.set_width(ui.available_width());

        ui.horizontal(|ui| {
            ui.label(RichText::new(&item.callsign).color(Color32::WHITE).size(12.0).monospace().strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(RichText::new(&item.origin_country).color(kind_color).size(10.0));
            });
        });

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 8.0;
            let kind = match item.kind {
                FlightKind::Military => "🛡 Military",
                FlightKind::Private => "✈ Private",
            };
            ui.label(RichText::new(kind).color(kind_color).size(9.0));
            ui.label(RichText::new(format!("{} km/h", item.speed_kmh)).color(style::TEXT_DIM).size(9.0).monospace());
            ui.label(RichText::new(format!("{} m", item.altitude_m)).color(style::TEXT_DIM).size(9.0).monospace());
            ui.label(RichText::new(&item.last_contact).color(style::TEXT_DIM).size(9.0).monospace());
        });
    });

    response
        .response
        .interact(egui::Sense::click())
        .on_hover_cursor(egui::CursorIcon::PointingHand)
        .clicked()
}
