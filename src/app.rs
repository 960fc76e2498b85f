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

//! The eframe application.
//!
//! Owns the tracker (the only flight state), the poller feeding it and the
//! map widget. Each frame drains poll events into the tracker, re-renders
//! when state changed, draws the frame and dispatches whatever the user did.

use std::time::Duration;

use eframe::egui;
use flight_core::view::Frame;
use flight_core::{
    Command, DemoSource, HttpSource, MapPresenter, Message, PollEvent, Poller, PollerConfig,
    Tracker,
};
use log::{error, info};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::map::MapView;
use crate::ui::{self, WelcomePopup};

const REPAINT_INTERVAL: Duration = Duration::from_millis(500);

pub struct FlightTrackerApp {
    runtime: Runtime,
    tracker: Tracker,
    presenter: MapPresenter,
    map_view: MapView,
    poller: Option<Poller>,
    poll_events: mpsc::UnboundedReceiver<PollEvent>,
    welcome: WelcomePopup,
    config: AppConfig,
    frame: Frame,
    rendered_revision: Option<u64>,
}

impl std::fmt::Debug for FlightTrackerApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlightTrackerApp")
            .field("tracker", &self.tracker)
            .field("poller", &self.poller)
            .finish_non_exhaustive()
    }
}

impl FlightTrackerApp {
    #[must_use]
    pub fn new(config: AppConfig, runtime: Runtime) -> Self {
        let tracker = Tracker::new(config.tracker_config());
        let frame = tracker.render();
        // Replaced by start_poller
        let (_, poll_events) = mpsc::unbounded_channel();

        let mut app = Self {
            runtime,
            presenter: MapPresenter::new(config.max_markers),
            map_view: MapView::new(config.default_view),
            poller: None,
            poll_events,
            welcome: WelcomePopup::new(config.show_welcome),
            frame,
            rendered_revision: None,
            tracker,
            config,
        };
        app.start_poller();
        app
    }

    /// Start polling the configured source, stopping any previous poller first.
    fn start_poller(&mut self) {
        if let Some(previous) = self.poller.take() {
            previous.shutdown();
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.poll_events = rx;
        let poller_config: PollerConfig = self.config.poller_config();
        let _guard = self.runtime.enter();

        let poller = if self.config.demo {
            Poller::spawn(DemoSource::new(), poller_config, tx)
        } else {
            match HttpSource::new(self.config.endpoint.clone()) {
                Ok(source) => Poller::spawn(source, poller_config, tx),
                Err(e) => {
                    error!("Cannot create HTTP client ({}), falling back to demo data", e);
                    Poller::spawn(DemoSource::new(), poller_config, tx)
                }
            }
        };
        self.poller = Some(poller);
    }

    fn drain_poll_events(&mut self) {
        while let Ok(event) = self.poll_events.try_recv() {
            let message = match event {
                PollEvent::Started { .. } => Message::FetchStarted,
                PollEvent::Completed {
                    generation,
                    result: Ok(snapshot),
                } => Message::FeedUpdated {
                    generation,
                    snapshot,
                },
                PollEvent::Completed {
                    generation,
                    result: Err(e),
                } => Message::FeedFailed {
                    generation,
                    error: e.to_string(),
                },
            };
            self.handle(message);
        }
    }

    /// Dispatch a message and carry out its commands in order.
    fn handle(&mut self, message: Message) {
        for command in self.tracker.dispatch(message) {
            match command {
                Command::FlyTo(viewport) => self.presenter.fly_to(&mut self.map_view, viewport),
                Command::Refresh => {
                    if let Some(poller) = &self.poller {
                        info!("Manual refresh");
                        poller.refresh();
                    }
                }
            }
        }
    }

    /// Re-render and push to the map only when tracker state changed.
    fn sync_frame(&mut self) {
        let revision = self.tracker.revision();
        if self.rendered_revision != Some(revision) {
            self.frame = self.tracker.render();
            self.presenter.apply(&mut self.map_view, &self.frame);
            self.rendered_revision = Some(revision);
        }
    }
}

impl eframe::App for FlightTrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(REPAINT_INTERVAL);

        let minimized = ctx.input(|i| i.viewport().minimized.unwrap_or(false));
        if let Some(poller) = &self.poller {
            poller.set_visible(!minimized);
        }

        self.drain_poll_events();
        self.sync_frame();

        let mut messages = Vec::new();

        egui::TopBottomPanel::top("status_bar").show(ctx, |ui| {
            ui::status_bar::show(ui, &self.frame.status);
        });

        egui::SidePanel::right("flight_sidebar")
            .default_width(self.config.sidebar_width)
            .resizable(true)
            .show(ctx, |ui| {
                messages.extend(ui::sidebar::show(ui, &self.frame.filters, &self.frame.list));
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if let Some(id) = self.map_view.show(ui) {
                    messages.push(Message::MarkerClicked(id));
                }
            });

        messages.extend(ui::modal::show(ctx, self.frame.detail.as_ref()));
        self.welcome.show(ctx);

        if !messages.is_empty() {
            for message in messages {
                self.handle(message);
            }
            self.sync_frame();
            ctx.request_repaint();
        }
    }
}

impl Drop for FlightTrackerApp {
    fn drop(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.shutdown();
        }
    }
}
