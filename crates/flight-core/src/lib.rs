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

//! Flight tracking core: data, filtering, focus and path projection.
//!
//! This crate holds everything about the flight dashboard that does not
//! depend on a particular UI toolkit. It is organized in layers:
//!
//! - **Entity layer** ([`flight`]): lenient record parsing and callsign
//!   classification
//! - **Data layer** ([`manager`]): the current flight set and its filter
//! - **Geometry** ([`geometry`]): great-circle projection of a flight's path
//! - **State store** ([`tracker`]): focus state machine and message dispatch
//! - **Presentation** ([`view`], [`map`]): frames rendered from state and the
//!   map surface seam
//! - **Feed** ([`feed`], [`poller`]): HTTP and demo sources, polled in the
//!   background
//!
//! # Quick Start
//!
//! ```no_run
//! use flight_core::{DemoSource, Message, PollEvent, Poller, PollerConfig, Tracker, TrackerConfig};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut tracker = Tracker::new(TrackerConfig::default());
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!     let _poller = Poller::spawn(DemoSource::new(), PollerConfig::default(), tx);
//!
//!     while let Some(event) = rx.recv().await {
//!         if let PollEvent::Completed { generation, result: Ok(snapshot) } = event {
//!             tracker.dispatch(Message::FeedUpdated { generation, snapshot });
//!             println!("{} flights shown", tracker.render().list.total);
//!         }
//!     }
//! }
//! ```

pub mod feed;
pub mod flight;
pub mod geometry;
pub mod manager;
pub mod map;
pub mod poller;
pub mod tracker;
pub mod view;

pub use feed::{DemoSource, FeedError, FeedSnapshot, FlightSource, HttpSource};
pub use flight::{Flight, FlightId, FlightKind, Position};
pub use geometry::{FlightPath, ProjectionMode};
pub use manager::{FilterState, FlightDataManager};
pub use map::{MapPresenter, MapSurface, Viewport};
pub use poller::{PollEvent, Poller, PollerConfig};
pub use tracker::{
    Command, ConnectionStatus, Focus, Message, StaleFocusPolicy, Tracker, TrackerConfig,
    TrackerState,
};
pub use view::{render, Frame, RenderLimits};
