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

//! Header bar: connection indicator and counters.

use egui::RichText;
use flight_core::view::StatusView;

use super::style;

pub fn show(ui: &mut egui::Ui, status: &StatusView) {
    ui.horizontal(|ui| {
        ui.label(RichText::new("✈ Flight Tracker").size(16.0).strong().color(style::ACCENT));
        ui.separator();

        ui.label(RichText::new("●").color(style::status_color(status.connection)));
        ui.label(status.connection.label());
        ui.separator();

        ui.label(format!("Flights: {}", status.shown));
        if let Some(reported) = status.reported {
            ui.label(RichText::new(format!("({reported} reported)")).color(style::TEXT_DIM));
        }
        ui.separator();

        ui.label(format!(
            "Updated: {}",
            status.last_updated.as_deref().unwrap_or("--:--:--")
        ));

        if status.demo_mode {
            ui.separator();
            ui.label(RichText::new("🎯 Demo Mode Active").color(style::status_color(status.connection)))
                .on_hover_text("Displaying sample data because live data is unavailable.");
        }
    });
}
