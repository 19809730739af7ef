//! Reconciliation Coordinator.
//!
//! Owns the mount/unmount lifecycle of the live map. On mount it
//! initializes the rendering surface, binds the scene store to it, and
//! starts the two independent loaders; on unmount it cancels them,
//! suppresses every still-in-flight continuation, and clears the scene.
//!
//! # Lifecycle
//!
//! ```text
//! Unmounted ──mount()──► Mounting ──surface ready──► Ready
//!     ▲                     │ surface init failed       │
//!     └─────────────────────┘◄────── Unmounting ◄── unmount()
//! ```
//!
//! Surface initialization failure is fatal for that mount attempt and is
//! reported to the caller; it is not retried. All other failures (network,
//! malformed geometry) stay local to the loaders.
//!
//! # Teardown guarantee
//!
//! Unmount cancels the shared token before clearing the store. Every loader
//! continuation checks the token after resuming from network I/O and before
//! touching the store, so a fetch or poll that resolves after teardown
//! produces zero scene mutations. The underlying requests are not aborted
//! at the transport level; only their effects are suppressed.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::FleetApi;
use crate::config::MapConfig;
use crate::loader::GeometryLoader;
use crate::metrics::{MetricsSnapshot, ReconcilerMetrics};
use crate::poller::PositionPoller;
use crate::scene::SceneStore;
use crate::surface::{RenderSurface, SurfaceError};

/// Errors reported by [`MapCoordinator::mount`].
#[derive(Debug, Error)]
pub enum MountError {
    /// The rendering surface failed to initialize. Fatal for this mount
    /// attempt; the coordinator stays unmounted.
    #[error("surface failed to initialize: {0}")]
    SurfaceInit(#[from] SurfaceError),

    /// `mount` was called while already mounted (or mid-lifecycle).
    #[error("coordinator is already mounted")]
    AlreadyMounted,
}

/// Lifecycle state of the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Unmounted,
    Mounting,
    Ready,
    Unmounting,
}

/// Coordinates the live map lifecycle: one scene store, one surface
/// binding, two loaders.
///
/// The store is exclusively owned by this coordinator; nothing else mutates
/// it for the coordinator's lifetime.
pub struct MapCoordinator {
    api: Arc<dyn FleetApi>,
    store: Arc<SceneStore>,
    metrics: Arc<ReconcilerMetrics>,
    config: MapConfig,
    state: CoordinatorState,
    cancel: Option<CancellationToken>,
    tasks: Vec<JoinHandle<()>>,
}

impl MapCoordinator {
    /// Create an unmounted coordinator.
    pub fn new(api: Arc<dyn FleetApi>, config: MapConfig) -> Self {
        Self {
            api,
            store: Arc::new(SceneStore::new()),
            metrics: Arc::new(ReconcilerMetrics::new()),
            config,
            state: CoordinatorState::Unmounted,
            cancel: None,
            tasks: Vec::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// The scene store owned by this coordinator.
    pub fn store(&self) -> &Arc<SceneStore> {
        &self.store
    }

    /// Point-in-time reconciler counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Bind the scene to a rendering surface and start both loaders.
    ///
    /// Waits for the surface to finish initializing before anything touches
    /// it. On initialization failure the coordinator returns to
    /// `Unmounted` and reports the error; nothing is retried.
    pub async fn mount(&mut self, surface: Arc<dyn RenderSurface>) -> Result<(), MountError> {
        if self.state != CoordinatorState::Unmounted {
            return Err(MountError::AlreadyMounted);
        }
        self.state = CoordinatorState::Mounting;
        debug!("Mounting live map");

        if let Err(e) = surface.initialize().await {
            self.state = CoordinatorState::Unmounted;
            return Err(MountError::SurfaceInit(e));
        }

        self.store.bind(surface);

        let cancel = CancellationToken::new();

        let loader = Arc::new(GeometryLoader::new(
            Arc::clone(&self.api),
            Arc::clone(&self.store),
            Arc::clone(&self.metrics),
            cancel.clone(),
            self.config.routing_profile.clone(),
        ));
        let poller = Arc::new(PositionPoller::new(
            Arc::clone(&self.api),
            Arc::clone(&self.store),
            Arc::clone(&self.metrics),
            cancel.clone(),
            self.config.advance_positions,
        ));

        self.tasks
            .push(tokio::spawn(loader.run(self.config.refresh_interval)));
        self.tasks
            .push(tokio::spawn(poller.run(self.config.poll_interval)));

        self.cancel = Some(cancel);
        self.state = CoordinatorState::Ready;
        info!("Live map mounted");
        Ok(())
    }

    /// Stop both loaders and clear the scene.
    ///
    /// Idempotent: unmounting while not mounted is a no-op.
    pub async fn unmount(&mut self) {
        if self.state != CoordinatorState::Ready {
            debug!(state = ?self.state, "Unmount requested while not mounted, ignoring");
            return;
        }
        self.state = CoordinatorState::Unmounting;

        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }

        self.store.clear_and_unbind();
        self.state = CoordinatorState::Unmounted;
        info!("Live map unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::api::MockFleetApi;
    use crate::surface::tests::RecordingSurface;

    fn coordinator() -> MapCoordinator {
        MapCoordinator::new(Arc::new(MockFleetApi::new()), MapConfig::default())
    }

    #[tokio::test]
    async fn test_mount_reaches_ready() {
        let mut coordinator = coordinator();
        assert_eq!(coordinator.state(), CoordinatorState::Unmounted);

        coordinator
            .mount(Arc::new(RecordingSurface::new()))
            .await
            .unwrap();
        assert_eq!(coordinator.state(), CoordinatorState::Ready);

        coordinator.unmount().await;
        assert_eq!(coordinator.state(), CoordinatorState::Unmounted);
    }

    #[tokio::test]
    async fn test_surface_init_failure_is_fatal_for_the_attempt() {
        let mut coordinator = coordinator();
        let result = coordinator
            .mount(Arc::new(RecordingSurface::failing_init("no base layer")))
            .await;

        assert!(matches!(result, Err(MountError::SurfaceInit(_))));
        assert_eq!(coordinator.state(), CoordinatorState::Unmounted);
        assert!(!coordinator.store().is_bound());
    }

    #[tokio::test]
    async fn test_double_mount_is_rejected() {
        let mut coordinator = coordinator();
        coordinator
            .mount(Arc::new(RecordingSurface::new()))
            .await
            .unwrap();

        let result = coordinator.mount(Arc::new(RecordingSurface::new())).await;
        assert!(matches!(result, Err(MountError::AlreadyMounted)));

        coordinator.unmount().await;
    }

    #[tokio::test]
    async fn test_unmount_while_unmounted_is_a_noop() {
        let mut coordinator = coordinator();
        coordinator.unmount().await;
        assert_eq!(coordinator.state(), CoordinatorState::Unmounted);
    }

    #[tokio::test]
    async fn test_remount_after_unmount_works() {
        let mut coordinator = coordinator();
        coordinator
            .mount(Arc::new(RecordingSurface::new()))
            .await
            .unwrap();
        coordinator.unmount().await;

        coordinator
            .mount(Arc::new(RecordingSurface::new()))
            .await
            .unwrap();
        assert_eq!(coordinator.state(), CoordinatorState::Ready);
        coordinator.unmount().await;
    }
}
