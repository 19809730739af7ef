//! Live Position Poller.
//!
//! Fetches vehicle positions on a fixed interval (plus one immediate poll
//! on start) and upserts one marker per vehicle into the scene store. A
//! busy flag guarantees at most one poll in flight: when the backend is
//! slower than the interval, ticks are skipped outright rather than queued,
//! so polls can never pile up or resolve against each other out of order.
//!
//! Markers are never removed here. A vehicle missing from one poll result
//! may just be a transient gap, and its marker stays where it was.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use crate::api::FleetApi;
use crate::metrics::ReconcilerMetrics;
use crate::scene::SceneStore;

/// Polls live vehicle positions into the scene store.
pub struct PositionPoller {
    api: Arc<dyn FleetApi>,
    store: Arc<SceneStore>,
    metrics: Arc<ReconcilerMetrics>,
    cancel: CancellationToken,
    /// Ask the server to step its simulated vehicles on each poll.
    advance: bool,
    /// Set while a poll is in flight; ticks arriving meanwhile are skipped.
    busy: AtomicBool,
}

impl PositionPoller {
    pub fn new(
        api: Arc<dyn FleetApi>,
        store: Arc<SceneStore>,
        metrics: Arc<ReconcilerMetrics>,
        cancel: CancellationToken,
        advance: bool,
    ) -> Self {
        Self {
            api,
            store,
            metrics,
            cancel,
            advance,
            busy: AtomicBool::new(false),
        }
    }

    /// Run a single poll.
    ///
    /// On failure the existing markers are left untouched and nothing
    /// propagates past this boundary.
    pub async fn poll(&self) {
        let positions = match self.api.live_positions(self.advance).await {
            Ok(positions) => positions,
            Err(e) => {
                warn!(error = %e, "Live position fetch failed, keeping current markers");
                self.metrics.poll_failed();
                return;
            }
        };

        // Teardown may have happened while the request was in flight.
        if self.cancel.is_cancelled() {
            return;
        }

        for position in positions {
            let last_seen_at = position
                .last_update
                .as_deref()
                .and_then(parse_last_update)
                .unwrap_or_else(Utc::now);

            self.store
                .upsert_marker(&position.vehicle_id, position.lat, position.lon, last_seen_at);
        }

        self.metrics.poll_completed();
    }

    /// Run the poll loop until cancelled.
    ///
    /// The first tick fires immediately. Each tick claims the busy flag and
    /// spawns the poll as its own task; a tick that finds the flag already
    /// claimed is dropped, never queued.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        info!(interval_secs = interval.as_secs_f64(), "Position poller started");

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                _ = ticker.tick() => {
                    if self.busy.swap(true, Ordering::AcqRel) {
                        trace!("Previous poll still in flight, skipping tick");
                        self.metrics.tick_skipped();
                        continue;
                    }

                    let poller = Arc::clone(&self);
                    tokio::spawn(async move {
                        poller.poll().await;
                        poller.busy.store(false, Ordering::Release);
                    });
                }
            }
        }

        info!("Position poller stopped");
    }
}

/// Parse the backend's `last_update` timestamp.
///
/// The server emits RFC 3339 with a trailing `Z`. Anything unparsable is
/// treated as absent and the receipt time is used instead.
fn parse_last_update(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
