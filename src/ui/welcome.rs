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

//! Startup welcome popup.

use std::time::{Duration, Instant};

use egui::RichText;

const SHOW_DELAY: Duration = Duration::from_secs(2);
const AUTO_CLOSE_AFTER: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Visible,
    Closed,
}

/// Appears shortly after startup, closes on click or after a while.
#[derive(Debug)]
pub struct WelcomePopup {
    started: Instant,
    dismissed: bool,
}

impl WelcomePopup {
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            started: Instant::now(),
            dismissed: !enabled,
        }
    }

    fn phase(&self, now: Instant) -> Phase {
        let elapsed = now.duration_since(self.started);
        if self.dismissed || elapsed >= AUTO_CLOSE_AFTER {
            Phase::Closed
        } else if elapsed < SHOW_DELAY {
            Phase::Pending
        } else {
            Phase::Visible
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) {
        match self.phase(Instant::now()) {
            Phase::Closed => {}
            Phase::Pending => ctx.request_repaint_after(SHOW_DELAY),
            Phase::Visible => {
                egui::Window::new("welcome")
                    .title_bar(false)
                    .resizable(false)
                    .fixed_size(egui::vec2(350.0, 0.0))
                    .anchor(egui::Align2::LEFT_CENTER, egui::vec2(20.0, 0.0))
                    .show(ctx, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new("✈").size(28.0));
                            ui.heading("Welcome to Flight Tracker");
                        });
                        ui.add_space(8.0);
                        ui.label(
                            "Live flight data from around the world, for educational purposes only. \
                             If live data is unavailable the tracker switches to demo mode with \
                             sample data.",
                        );
                        ui.add_space(8.0);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                            if ui.button("✓ Got it").clicked() {
                                self.dismissed = true;
                            }
                        });
                    });
                ctx.request_repaint_after(AUTO_CLOSE_AFTER);
            }
        }
    }
}
