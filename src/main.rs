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

mod app;
mod config;
mod map;
mod ui;

use clap::Parser;
use eframe::egui;
use flight_core::StaleFocusPolicy;
use log::info;

use crate::app::FlightTrackerApp;
use crate::config::AppConfig;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Live flight positions on a map, filterable by country
#[derive(Parser, Debug)]
#[command(name = "flight-tracker", version, about)]
struct Cli {
    /// Flight feed URL
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Use generated demo data instead of the feed
    #[arg(long)]
    demo: bool,

    /// Seconds between refreshes
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Maximum markers drawn on the map
    #[arg(long, value_name = "N")]
    max_markers: Option<usize>,

    /// Drop focus when the focused flight leaves the feed
    #[arg(long)]
    clear_stale_focus: bool,
}

impl Cli {
    /// Override loaded settings with anything given on the command line.
    fn apply(self, config: &mut AppConfig) {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if self.demo {
            config.demo = true;
        }
        if let Some(interval) = self.interval {
            config.poll_interval_secs = interval;
        }
        if let Some(max_markers) = self.max_markers {
            config.max_markers = max_markers;
        }
        if self.clear_stale_focus {
            config.stale_focus = StaleFocusPolicy::Clear;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = AppConfig::load_or_default();
    cli.apply(&mut config);

    match AppConfig::get_config_path() {
        Ok(path) => info!("Configuration file: {}", path.display()),
        Err(e) => info!("Configuration file location unavailable: {}", e),
    }
    info!(
        "Starting Flight Tracker ({})",
        if config.demo { "demo data" } else { config.endpoint.as_str() }
    );

    let runtime = tokio::runtime::Runtime::new()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("Flight Tracker"),
        ..Default::default()
    };

    eframe::run_native(
        "Flight Tracker",
        options,
        Box::new(move |_cc| Ok(Box::new(FlightTrackerApp::new(config, runtime)))),
    )?;
    Ok(())
}
