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

//! Shared colors.

use egui::Color32;
use flight_core::{ConnectionStatus, FlightKind};

pub const MILITARY: Color32 = Color32::from_rgb(0xff, 0x6b, 0x6b);
pub const PRIVATE: Color32 = Color32::from_rgb(0x51, 0xcf, 0x66);
pub const PATH: Color32 = Color32::from_rgb(0x66, 0x7e, 0xea);
pub const ACCENT: Color32 = Color32::from_rgb(0x76, 0x4b, 0xa2);

pub const TEXT_DIM: Color32 = Color32::from_rgb(150, 150, 150);
pub const LABEL_BACKGROUND: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 180);
pub const FOCUSED_ROW: Color32 = Color32::from_rgba_premultiplied(60, 70, 120, 200);

#[must_use]
pub fn kind_color(kind: FlightKind) -> Color32 {
    match kind {
        FlightKind::Military => MILITARY,
        FlightKind::Private => PRIVATE,
    }
}

#[must_use]
pub fn status_color(status: ConnectionStatus) -> Color32 {
    match status {
        ConnectionStatus::Connected => Color32::from_rgb(100, 255, 100),
        ConnectionStatus::Demo => Color32::from_rgb(255, 200, 50),
        ConnectionStatus::Connecting => TEXT_DIM,
        ConnectionStatus::Error => Color32::from_rgb(220, 50, 50),
    }
}
