//! Console rendering surface.
//!
//! The CLI has no map to draw on, so its surface adapter renders the scene
//! as structured log lines. This is the same adapter seam a MapLibre or
//! Leaflet shell would implement against a real map instance.

use futures::future::BoxFuture;
use tracing::{debug, info};

use fleetmap::surface::{LayerSpec, RenderSurface, SurfaceError};

/// Rendering surface that logs scene mutations instead of drawing them.
pub struct ConsoleSurface;

impl ConsoleSurface {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for ConsoleSurface {
    fn initialize(&self) -> BoxFuture<'_, Result<(), SurfaceError>> {
        Box::pin(async {
            info!("Console surface ready");
            Ok(())
        })
    }

    fn upsert_source(&self, id: &str, coordinates: &[[f64; 2]]) {
        debug!(source = %id, points = coordinates.len(), "Source upserted");
    }

    fn upsert_layer(&self, id: &str, spec: &LayerSpec) {
        info!(layer = %id, color = %spec.color, "Layer upserted");
    }

    fn remove_layer(&self, id: &str) {
        debug!(layer = %id, "Layer removed");
    }

    fn remove_source(&self, id: &str) {
        debug!(source = %id, "Source removed");
    }

    fn upsert_marker(&self, id: &str, lat: f64, lon: f64) {
        info!(vehicle = %id, lat, lon, "Marker upserted");
    }

    fn remove_marker(&self, id: &str) {
        debug!(vehicle = %id, "Marker removed");
    }
}
