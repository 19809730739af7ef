//! Rendering surface capability.
//!
//! The reconciliation core never talks to a concrete map library. It drives
//! the narrow [`RenderSurface`] capability instead, implemented by one
//! adapter per rendering technology (a MapLibre adapter in a web shell, a
//! console adapter in the CLI, a recording mock in tests).
//!
//! All mutation operations are idempotent by stable id: upserting the same
//! entity twice replaces rather than duplicates, and removing an absent
//! entity is a no-op. Only initialization can fail; a surface that cannot
//! bring up its base layer is unusable for that mount attempt.

use futures::future::BoxFuture;
use thiserror::Error;

use crate::api::RouteStatus;

/// Errors reported by a rendering surface.
#[derive(Debug, Clone, Error)]
pub enum SurfaceError {
    /// The surface failed to initialize (base layer never became ready).
    #[error("surface failed to initialize: {0}")]
    Init(String),
}

/// Paint properties for a line layer.
///
/// The core only decides color (from route status) and width; everything
/// else is the adapter's business.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    /// Id of the source the layer draws from.
    pub source_id: String,
    /// Line color as a CSS hex string.
    pub color: &'static str,
    /// Line width in surface units.
    pub width: f64,
}

/// Default line width for route layers.
const ROUTE_LINE_WIDTH: f64 = 4.0;

impl LayerSpec {
    /// Build the line spec for a route, colored by its status.
    pub fn for_route(source_id: String, status: RouteStatus) -> Self {
        let color = match status {
            RouteStatus::Active => "#2f9e44",
            RouteStatus::Planned => "#1971c2",
            RouteStatus::Delayed => "#e03131",
            RouteStatus::Unknown => "#868e96",
        };
        Self {
            source_id,
            color,
            width: ROUTE_LINE_WIDTH,
        }
    }
}

/// Capability interface for the component that actually draws the scene.
///
/// Implementations must tolerate calls in any order and repeated calls with
/// the same id. The core guarantees it never calls a mutation after the
/// owning coordinator has torn the binding down.
pub trait RenderSurface: Send + Sync {
    /// Bring the surface up (load the base layer). Fatal for the mount
    /// attempt on failure.
    fn initialize(&self) -> BoxFuture<'_, Result<(), SurfaceError>>;

    /// Create or replace a line source with the given `[lon, lat]` path.
    fn upsert_source(&self, id: &str, coordinates: &[[f64; 2]]);

    /// Create or replace a line layer.
    fn upsert_layer(&self, id: &str, spec: &LayerSpec);

    /// Remove a layer; no-op if absent.
    fn remove_layer(&self, id: &str);

    /// Remove a source; no-op if absent.
    fn remove_source(&self, id: &str);

    /// Create or move a point marker.
    fn upsert_marker(&self, id: &str, lat: f64, lon: f64);

    /// Remove a marker; no-op if absent.
    fn remove_marker(&self, id: &str);
}

#[cfg(test)]
pub mod tests {
    use super::*;

    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A single recorded surface call.
    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceCall {
        UpsertSource(String, usize),
        UpsertLayer(String),
        RemoveLayer(String),
        RemoveSource(String),
        UpsertMarker(String, f64, f64),
        RemoveMarker(String),
    }

    /// Recording surface for tests.
    ///
    /// Records every mutation so tests can assert exact call sequences and
    /// counts. Initialization failure is configurable.
    pub struct RecordingSurface {
        pub calls: Mutex<Vec<SurfaceCall>>,
        pub init_calls: AtomicUsize,
        init_result: Mutex<Result<(), SurfaceError>>,
    }

    impl RecordingSurface {
        pub fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                init_calls: AtomicUsize::new(0),
                init_result: Mutex::new(Ok(())),
            }
        }

        pub fn failing_init(message: &str) -> Self {
            let surface = Self::new();
            *surface.init_result.lock() = Err(SurfaceError::Init(message.to_string()));
            surface
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        fn record(&self, call: SurfaceCall) {
            self.calls.lock().push(call);
        }
    }

    impl RenderSurface for RecordingSurface {
        fn initialize(&self) -> BoxFuture<'_, Result<(), SurfaceError>> {
            self.init_calls.fetch_add(1, Ordering::Relaxed);
            let result = self.init_result.lock().clone();
            Box::pin(async move { result })
        }

        fn upsert_source(&self, id: &str, coordinates: &[[f64; 2]]) {
            self.record(SurfaceCall::UpsertSource(id.to_string(), coordinates.len()));
        }

        fn upsert_layer(&self, id: &str, _spec: &LayerSpec) {
            self.record(SurfaceCall::UpsertLayer(id.to_string()));
        }

        fn remove_layer(&self, id: &str) {
            self.record(SurfaceCall::RemoveLayer(id.to_string()));
        }

        fn remove_source(&self, id: &str) {
            self.record(SurfaceCall::RemoveSource(id.to_string()));
        }

        fn upsert_marker(&self, id: &str, lat: f64, lon: f64) {
            self.record(SurfaceCall::UpsertMarker(id.to_string(), lat, lon));
        }

        fn remove_marker(&self, id: &str) {
            self.record(SurfaceCall::RemoveMarker(id.to_string()));
        }
    }

    #[test]
    fn test_layer_spec_colors_by_status() {
        let active = LayerSpec::for_route("route-src-r1".to_string(), RouteStatus::Active);
        let delayed = LayerSpec::for_route("route-src-r1".to_string(), RouteStatus::Delayed);
        assert_ne!(active.color, delayed.color);
        assert_eq!(active.source_id, "route-src-r1");
    }

    #[tokio::test]
    async fn test_recording_surface_failing_init() {
        let surface = RecordingSurface::failing_init("style never loaded");
        let result = surface.initialize().await;
        assert!(matches!(result, Err(SurfaceError::Init(_))));
        assert_eq!(surface.init_calls.load(Ordering::Relaxed), 1);
    }
}
