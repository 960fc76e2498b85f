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

//! Flight detail window.

use egui::RichText;
use flight_core::view::DetailView;
use flight_core::{FlightKind, Message};

use super::style;

/// Draw the detail window for `detail`, if any.
pub fn show(ctx: &egui::Context, detail: Option<&DetailView>) -> Vec<Message> {
    let mut messages = Vec::new();
    let Some(detail) = detail else {
        return messages;
    };

    let icon = match detail.kind {
        FlightKind::Military => "🛡",
        FlightKind::Private => "✈",
    };
    let mut open = true;

    egui::Window::new(format!("{icon} Flight {}", detail.callsign))
        .id(egui::Id::new("flight_detail"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.columns(2, |columns| {
                columns[0].label(RichText::new("Flight Information").strong());
                field(&mut columns[0], "Callsign", &detail.callsign);
                columns[0].horizontal(|ui| {
                    ui.label(RichText::new("Type:").strong());
                    ui.label(
                        RichText::new(detail.kind.label().to_uppercase())
                            .color(style::kind_color(detail.kind)),
                    );
                });
                field(&mut columns[0], "From", &detail.origin_country);
                field(&mut columns[0], "To", &detail.destination_country);

                columns[1].label(RichText::new("Position Data").strong());
                let coordinates = detail.position.map_or_else(
                    || "Unavailable".to_string(),
                    |p| format!("{:.4}, {:.4}", p.latitude, p.longitude),
                );
                field(&mut columns[1], "Coordinates", &coordinates);
                field(&mut columns[1], "Altitude", &format!("{} m", detail.altitude_m));
                field(&mut columns[1], "Speed", &format!("{} km/h", detail.speed_kmh));
                field(&mut columns[1], "Heading", &format!("{}°", detail.heading_deg));
            });

            ui.separator();
            ui.horizontal(|ui| {
                let track = ui.add_enabled(detail.trackable, egui::Button::new("✈ Track on Map"));
                if track.clicked() {
                    messages.push(Message::TrackFlight(detail.id.clone()));
                }
                if ui.button("Close").clicked() {
                    messages.push(Message::CloseModal);
                }
            });
        });

    if !open {
        messages.push(Message::CloseModal);
    }
    messages
}

fn field(ui: &mut egui::Ui, name: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(RichText::new(format!("{name}:")).strong());
        ui.label(value);
    });
}
