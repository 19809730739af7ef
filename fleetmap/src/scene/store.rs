//! Authoritative in-memory scene state.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::api::RouteStatus;
use crate::surface::{LayerSpec, RenderSurface};

use super::model::{
    layer_id, source_id, LayerRecord, LayerUpsert, MarkerUpsert, RouteGeometry, VehicleMarker,
};

/// The authoritative map of currently rendered entities.
///
/// The store owns the scene; the rendering surface is a projection of it.
/// While a surface is bound, every accepted mutation is mirrored to it
/// inside the same critical section that updates the map, so the epoch check
/// and the surface write are atomic with respect to concurrently resolving
/// refreshes.
///
/// One store is exclusively owned by one coordinator for its lifetime.
pub struct SceneStore {
    markers: RwLock<HashMap<String, VehicleMarker>>,
    /// Keyed by route id.
    layers: RwLock<HashMap<String, LayerRecord>>,
    surface: RwLock<Option<Arc<dyn RenderSurface>>>,
}

impl SceneStore {
    /// Create an empty, unbound store.
    pub fn new() -> Self {
        Self {
            markers: RwLock::new(HashMap::new()),
            layers: RwLock::new(HashMap::new()),
            surface: RwLock::new(None),
        }
    }

    /// Bind the store to a rendering surface.
    ///
    /// Mutations accepted after binding are mirrored to the surface.
    pub fn bind(&self, surface: Arc<dyn RenderSurface>) {
        *self.surface.write() = Some(surface);
    }

    /// Whether a surface is currently bound.
    pub fn is_bound(&self) -> bool {
        self.surface.read().is_some()
    }

    /// Create or move the marker for a vehicle.
    pub fn upsert_marker(
        &self,
        vehicle_id: &str,
        lat: f64,
        lon: f64,
        last_seen_at: DateTime<Utc>,
    ) -> MarkerUpsert {
        let mut markers = self.markers.write();
        let outcome = match markers.get_mut(vehicle_id) {
            Some(marker) => {
                marker.lat = lat;
                marker.lon = lon;
                marker.last_seen_at = last_seen_at;
                MarkerUpsert::Updated
            }
            None => {
                markers.insert(
                    vehicle_id.to_string(),
                    VehicleMarker {
                        vehicle_id: vehicle_id.to_string(),
                        lat,
                        lon,
                        last_seen_at,
                    },
                );
                MarkerUpsert::Created
            }
        };

        if let Some(surface) = self.surface.read().as_ref() {
            surface.upsert_marker(vehicle_id, lat, lon);
        }

        outcome
    }

    /// Store a route geometry, gated by epoch.
    ///
    /// A geometry strictly newer than the stored one replaces it; an equal
    /// epoch is reapplied idempotently; an older epoch is discarded. The
    /// stored layer therefore always reflects the highest epoch ever
    /// resolved for the route, regardless of network completion order.
    pub fn upsert_layer(&self, geometry: RouteGeometry, status: RouteStatus) -> LayerUpsert {
        let mut layers = self.layers.write();

        let outcome = match layers.get(&geometry.route_id) {
            Some(existing) if geometry.epoch < existing.geometry.epoch => return LayerUpsert::Stale,
            Some(existing) if geometry.epoch == existing.geometry.epoch => LayerUpsert::Reapplied,
            _ => LayerUpsert::Applied,
        };

        let record = LayerRecord {
            layer_id: layer_id(&geometry.route_id),
            source_id: source_id(&geometry.route_id),
            spec: LayerSpec::for_route(source_id(&geometry.route_id), status),
            geometry,
        };

        // Mirror under the write lock: a concurrently resolving older epoch
        // must not interleave between the map update and the surface write.
        if let Some(surface) = self.surface.read().as_ref() {
            surface.upsert_source(&record.source_id, &record.geometry.coordinates);
            surface.upsert_layer(&record.layer_id, &record.spec);
        }

        layers.insert(record.geometry.route_id.clone(), record);
        outcome
    }

    /// Remove every entity from the scene and drop the surface binding.
    ///
    /// Layers are removed before their sources, the order rendering
    /// libraries require.
    pub fn clear_and_unbind(&self) {
        let surface = self.surface.write().take();

        let mut layers = self.layers.write();
        let mut markers = self.markers.write();

        if let Some(surface) = surface {
            for record in layers.values() {
                surface.remove_layer(&record.layer_id);
                surface.remove_source(&record.source_id);
            }
            for vehicle_id in markers.keys() {
                surface.remove_marker(vehicle_id);
            }
        }

        layers.clear();
        markers.clear();
    }

    /// Look up the marker for a vehicle.
    pub fn marker(&self, vehicle_id: &str) -> Option<VehicleMarker> {
        self.markers.read().get(vehicle_id).cloned()
    }

    /// Look up the layer for a route.
    pub fn layer(&self, route_id: &str) -> Option<LayerRecord> {
        self.layers.read().get(route_id).cloned()
    }

    /// Number of markers currently in the scene.
    pub fn marker_count(&self) -> usize {
        self.markers.read().len()
    }

    /// Number of layers currently in the scene.
    pub fn layer_count(&self) -> usize {
        self.layers.read().len()
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new()
    }
}
