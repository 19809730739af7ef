//! Route Geometry Loader.
//!
//! Periodically fetches the active route list and resolves one routed
//! geometry per drawable route, upserting line layers into the scene store.
//! Each refresh cycle carries an epoch assigned at issue time; the store
//! discards any geometry older than what it already holds, so a slow
//! response to an old refresh can never overwrite the result of a newer one
//! that resolved faster. That guard is the loader's entire concurrency
//! discipline; refresh cycles are allowed to overlap.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::api::{FleetApi, Route};
use crate::metrics::ReconcilerMetrics;
use crate::scene::{LayerUpsert, RouteGeometry, SceneStore};

/// Minimum stops for a route to have a drawable path.
const MIN_DRAWABLE_STOPS: usize = 2;

/// Loads route geometries into the scene store.
pub struct GeometryLoader {
    api: Arc<dyn FleetApi>,
    store: Arc<SceneStore>,
    metrics: Arc<ReconcilerMetrics>,
    cancel: CancellationToken,
    /// Next refresh cycle epoch. Monotonically increasing for the life of
    /// the loader.
    epoch: AtomicU64,
    /// Routing profile forwarded to the geometry endpoint.
    profile: String,
}

impl GeometryLoader {
    pub fn new(
        api: Arc<dyn FleetApi>,
        store: Arc<SceneStore>,
        metrics: Arc<ReconcilerMetrics>,
        cancel: CancellationToken,
        profile: impl Into<String>,
    ) -> Self {
        Self {
            api,
            store,
            metrics,
            cancel,
            epoch: AtomicU64::new(0),
            profile: profile.into(),
        }
    }

    /// The epoch of the most recently issued refresh cycle.
    pub fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Relaxed)
    }

    /// Run one refresh cycle.
    ///
    /// Fetches the active route list and resolves geometries for all
    /// drawable routes concurrently. Failures are local: a failed route
    /// list fetch retains every existing layer, and one route's failure
    /// never affects the others.
    pub async fn refresh_routes(&self) {
        let epoch = self.epoch.fetch_add(1, Ordering::Relaxed) + 1;

        let routes = match self.api.active_routes().await {
            Ok(routes) => routes,
            Err(e) => {
                warn!(error = %e, epoch, "Failed to fetch active routes, keeping current layers");
                self.metrics.route_list_failed();
                return;
            }
        };

        if self.cancel.is_cancelled() {
            return;
        }

        let mut requests = Vec::with_capacity(routes.len());
        for route in routes {
            if route.stops.len() < MIN_DRAWABLE_STOPS {
                debug!(
                    route_id = %route.id,
                    stops = route.stops.len(),
                    "Skipping route with fewer than two stops"
                );
                continue;
            }
            requests.push(self.resolve_route(route, epoch));
        }

        futures::future::join_all(requests).await;
        self.metrics.refresh_completed();
    }

    /// Resolve and store the geometry for a single route.
    async fn resolve_route(&self, route: Route, epoch: u64) {
        let coords = route.stop_coordinates();

        let line = match self.api.route_geometry(coords, &self.profile).await {
            Ok(line) => line,
            Err(e) => {
                warn!(
                    error = %e,
                    route_id = %route.id,
                    epoch,
                    "Route geometry request failed, keeping previous layer"
                );
                self.metrics.geometry_failed();
                return;
            }
        };

        // Teardown may have happened while the request was in flight.
        if self.cancel.is_cancelled() {
            return;
        }

        if !line.is_drawable() {
            warn!(
                route_id = %route.id,
                kind = %line.kind,
                coordinates = line.coordinates.len(),
                "Discarding malformed geometry"
            );
            self.metrics.geometry_malformed();
            return;
        }

        let geometry = RouteGeometry::new(route.id.clone(), line.coordinates, epoch);
        match self.store.upsert_layer(geometry, route.status) {
            LayerUpsert::Stale => {
                // Expected under overlapping refreshes, not an error.
                trace!(route_id = %route.id, epoch, "Discarded stale geometry");
                self.metrics.stale_geometry_dropped();
            }
            outcome => {
                debug!(route_id = %route.id, epoch, ?outcome, "Layer upserted");
            }
        }
    }

    /// Run the refresh loop until cancelled.
    ///
    /// Fires immediately, then at the fixed interval. Each tick spawns a
    /// fire-and-forget refresh; overlap across cycles is resolved by the
    /// epoch gate, not by serialization.
    pub async fn run(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        info!(interval_secs = interval.as_secs_f64(), "Geometry loader started");

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,

                _ = ticker.tick() => {
                    let loader = Arc::clone(&self);
                    tokio::spawn(async move {
                        loader.refresh_routes().await;
                    });
                }
            }
        }

        info!("Geometry loader stopped");
    }
}
