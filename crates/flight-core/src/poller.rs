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

//! Background feed polling.
//!
//! A [`Poller`] runs one task that fetches from a [`FlightSource`] on a fixed
//! interval while the view is visible, and reports each fetch as a pair of
//! [`PollEvent`]s. Fetches are numbered so the consumer can tell which
//! result is the newest.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::{mpsc, watch, Notify};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::feed::{FeedError, FeedSnapshot, FlightSource};

/// Default time between fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Poller settings.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub interval: Duration,
    /// Whether the view starts out visible. A hidden poller does not fetch.
    pub start_visible: bool,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            start_visible: true,
        }
    }
}

/// Events emitted by the poll task.
#[derive(Debug)]
pub enum PollEvent {
    /// A fetch is in flight.
    Started { generation: u64 },
    /// A fetch finished.
    Completed {
        generation: u64,
        result: Result<FeedSnapshot, FeedError>,
    },
}

/// Handle to a running poll task.
///
/// Dropping the handle stops the task.
pub struct Poller {
    visible_tx: watch::Sender<bool>,
    refresh: Arc<Notify>,
    cancel_token: CancellationToken,
}

impl std::fmt::Debug for Poller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Poller")
            .field("visible", &*self.visible_tx.borrow())
            .field("cancel_token", &self.cancel_token)
            .finish_non_exhaustive()
    }
}

impl Poller {
    /// Spawn the poll task on the current tokio runtime.
    ///
    /// If the view starts visible the first fetch happens immediately.
    #[must_use]
    pub fn spawn<S>(source: S, config: PollerConfig, events: mpsc::UnboundedSender<PollEvent>) -> Self
    where
        S: FlightSource + Send + Sync + 'static,
    {
        let (visible_tx, visible_rx) = watch::channel(config.start_visible);
        let refresh = Arc::new(Notify::new());
        let cancel_token = CancellationToken::new();

        info!(
            "Polling {} every {}s",
            source.describe(),
            config.interval.as_secs()
        );

        let task_refresh = Arc::clone(&refresh);
        let task_cancel = cancel_token.clone();
        tokio::spawn(async move {
            poll_loop(
                source,
                config.interval,
                visible_rx,
                task_refresh,
                task_cancel,
                events,
            )
            .await;
        });

        Self {
            visible_tx,
            refresh,
            cancel_token,
        }
    }

    /// Report view visibility. Becoming visible triggers an immediate fetch.
    pub fn set_visible(&self, visible: bool) {
        self.visible_tx.send_if_modified(|current| {
            if *current == visible {
                false
            } else {
                *current = visible;
                true
            }
        });
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        *self.visible_tx.borrow()
    }

    /// Fetch now instead of waiting for the next tick.
    ///
    /// Ignored while hidden, since becoming visible fetches anyway.
    pub fn refresh(&self) {
        if self.is_visible() {
            self.refresh.notify_one();
        } else {
            debug!("Ignoring refresh while hidden");
        }
    }

    /// Stop the poll task. Any fetch in flight is abandoned.
    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}

async fn poll_loop<S: FlightSource>(
    source: S,
    interval: Duration,
    mut visible_rx: watch::Receiver<bool>,
    refresh: Arc<Notify>,
    cancel_token: CancellationToken,
    events: mpsc::UnboundedSender<PollEvent>,
) {
    let mut generation = 0u64;

    loop {
        while !*visible_rx.borrow_and_update() {
            debug!("View hidden, polling suspended");
            tokio::select! {
                () = cancel_token.cancelled() => {
                    info!("Poller cancelled");
                    return;
                }
                changed = visible_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        generation += 1;
        if !poll_once(&source, generation, &events, &cancel_token).await {
            return;
        }

        tokio::select! {
            () = cancel_token.cancelled() => {
                info!("Poller cancelled");
                return;
            }
            () = sleep(interval) => {}
            () = refresh.notified() => {
                debug!("Manual refresh requested");
            }
            changed = visible_rx.changed() => {
                // Hidden: suspend at the top of the loop. Visible again: fetch now.
                if changed.is_err() {
                    return;
                }
            }
        }
    }
}

/// Run one fetch. Returns `false` when the poller should stop.
async fn poll_once<S: FlightSource>(
    source: &S,
    generation: u64,
    events: &mpsc::UnboundedSender<PollEvent>,
    cancel_token: &CancellationToken,
) -> bool {
    if events.send(PollEvent::Started { generation }).is_err() {
        return false;
    }

    let result = tokio::select! {
        () = cancel_token.cancelled() => {
            info!("Poller cancelled during fetch {}", generation);
            return false;
        }
        result = source.fetch() => result,
    };

    match &result {
        Ok(snapshot) => debug!("Fetch {} returned {} flights", generation, snapshot.flights.len()),
        Err(e) => debug!("Fetch {} failed: {}", generation, e),
    }

    events
        .send(PollEvent::Completed { generation, result })
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Returns queued results in order, then empty snapshots.
    #[derive(Default)]
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<FeedSnapshot, FeedError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn with(results: Vec<Result<FeedSnapshot, FeedError>>) -> Self {
            Self {
                script: Mutex::new(results.into()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl FlightSource for ScriptedSource {
        fn fetch(&self) -> impl Future<Output = Result<FeedSnapshot, FeedError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(snapshot(0)));
            async move { next }
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn snapshot(count: usize) -> FeedSnapshot {
        FeedSnapshot {
            count,
            flights: Vec::new(),
            last_updated: "00:00:00".to_string(),
            demo_mode: false,
        }
    }

    async fn next_completed(rx: &mut mpsc::UnboundedReceiver<PollEvent>) -> (u64, Result<FeedSnapshot, FeedError>) {
        loop {
            match rx.recv().await {
                Some(PollEvent::Completed { generation, result }) => return (generation, result),
                Some(PollEvent::Started { .. }) => {}
                None => panic!("poller stopped unexpectedly"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_fetch_is_immediate() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        let _poller = Poller::spawn(
            ScriptedSource::with(vec![Ok(snapshot(3))]),
            PollerConfig::default(),
            tx,
        );

        assert!(matches!(rx.recv().await, Some(PollEvent::Started { generation: 1 })));
        let (generation, result) = next_completed(&mut rx).await;
        assert_eq!(generation, 1);
        assert_eq!(result.unwrap().count, 3);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetches_on_interval() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _poller = Poller::spawn(ScriptedSource::default(), PollerConfig::default(), tx);

        next_completed(&mut rx).await;
        let after_first = Instant::now();
        let (generation, _) = next_completed(&mut rx).await;

        assert_eq!(generation, 2);
        assert!(after_first.elapsed() >= DEFAULT_POLL_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_reported_and_polling_continues() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _poller = Poller::spawn(
            ScriptedSource::with(vec![Err(FeedError::Status(503)), Ok(snapshot(1))]),
            PollerConfig::default(),
            tx,
        );

        let (_, first) = next_completed(&mut rx).await;
        assert!(matches!(first, Err(FeedError::Status(503))));
        let (generation, second) = next_completed(&mut rx).await;
        assert_eq!(generation, 2);
        assert!(second.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_view_suspends_polling() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let source = ScriptedSource::default();
        let calls = Arc::clone(&source.calls);
        let poller = Poller::spawn(
            source,
            PollerConfig {
                start_visible: false,
                ..PollerConfig::default()
            },
            tx,
        );

        sleep(Duration::from_secs(120)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(rx.try_recv().is_err());

        let shown_at = Instant::now();
        poller.set_visible(true);
        next_completed(&mut rx).await;
        assert!(shown_at.elapsed() < Duration::from_secs(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hiding_stops_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let source = ScriptedSource::default();
        let calls = Arc::clone(&source.calls);
        let poller = Poller::spawn(source, PollerConfig::default(), tx);

        next_completed(&mut rx).await;
        poller.set_visible(false);
        assert!(!poller.is_visible());

        sleep(DEFAULT_POLL_INTERVAL * 4).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_refresh_skips_wait() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let poller = Poller::spawn(ScriptedSource::default(), PollerConfig::default(), tx);

        next_completed(&mut rx).await;
        let requested_at = Instant::now();
        poller.refresh();
        let (generation, _) = next_completed(&mut rx).await;

        assert_eq!(generation, 2);
        assert!(requested_at.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_hidden_does_not_double_fetch() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let source = ScriptedSource::default();
        let calls = Arc::clone(&source.calls);
        let poller = Poller::spawn(
            source,
            PollerConfig {
                start_visible: false,
                ..PollerConfig::default()
            },
            tx,
        );

        poller.refresh();
        sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        poller.set_visible(true);
        let (generation, _) = next_completed(&mut rx).await;
        assert_eq!(generation, 1);

        sleep(DEFAULT_POLL_INTERVAL / 2).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_task() {
        let (first_tx, mut first_rx) = mpsc::unbounded_channel();
        let first_source = ScriptedSource::default();
        let first_calls = Arc::clone(&first_source.calls);
        let first = Poller::spawn(first_source, PollerConfig::default(), first_tx);
        next_completed(&mut first_rx).await;

        first.shutdown();
        let (second_tx, mut second_rx) = mpsc::unbounded_channel();
        let second_source = ScriptedSource::default();
        let second_calls = Arc::clone(&second_source.calls);
        let _second = Poller::spawn(second_source, PollerConfig::default(), second_tx);

        assert!(first_rx.recv().await.is_none());

        let (generation, _) = next_completed(&mut second_rx).await;
        assert_eq!(generation, 1);
        let (generation, _) = next_completed(&mut second_rx).await;
        assert_eq!(generation, 2);

        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let poller = Poller::spawn(ScriptedSource::default(), PollerConfig::default(), tx);

        next_completed(&mut rx).await;
        poller.shutdown();

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let poller = Poller::spawn(ScriptedSource::default(), PollerConfig::default(), tx);
        next_completed(&mut rx).await;

        drop(poller);
        assert!(rx.recv().await.is_none());
    }
}
