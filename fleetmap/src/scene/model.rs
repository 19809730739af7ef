//! Scene entity model.
//!
//! Entities are keyed by stable identifiers so upserts replace rather than
//! duplicate: one marker per vehicle, one layer (and backing source) per
//! route. Layer and source ids are deterministic functions of the route id,
//! stable across refresh cycles.

use chrono::{DateTime, Utc};

use crate::surface::LayerSpec;

/// Prefix for route line layer ids.
pub const LAYER_ID_PREFIX: &str = "route-line-";

/// Prefix for route line source ids.
pub const SOURCE_ID_PREFIX: &str = "route-src-";

/// Layer id for a route. Stable across refreshes.
pub fn layer_id(route_id: &str) -> String {
    format!("{}{}", LAYER_ID_PREFIX, route_id)
}

/// Source id for a route. Stable across refreshes.
pub fn source_id(route_id: &str) -> String {
    format!("{}{}", SOURCE_ID_PREFIX, route_id)
}

/// A resolved route geometry tagged with its refresh epoch.
///
/// The epoch is assigned when the refresh cycle is issued, not when the
/// response arrives, so completion order carries no authority: the store
/// only accepts a geometry whose epoch is at least the one it already holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    pub route_id: String,
    /// `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
    pub epoch: u64,
}

impl RouteGeometry {
    /// Create a new geometry for a route.
    pub fn new(route_id: impl Into<String>, coordinates: Vec<[f64; 2]>, epoch: u64) -> Self {
        Self {
            route_id: route_id.into(),
            coordinates,
            epoch,
        }
    }
}

/// A rendered vehicle marker.
///
/// Created on first sighting, moved on subsequent polls, removed only at
/// teardown. A poll that omits a vehicle leaves its marker untouched:
/// omission may be a transient gap, not a disappearance.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleMarker {
    pub vehicle_id: String,
    pub lat: f64,
    pub lon: f64,
    pub last_seen_at: DateTime<Utc>,
}

/// A rendered line layer and the geometry backing it.
#[derive(Debug, Clone)]
pub struct LayerRecord {
    pub layer_id: String,
    pub source_id: String,
    pub geometry: RouteGeometry,
    pub spec: LayerSpec,
}

/// Outcome of a layer upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerUpsert {
    /// A strictly newer (or first) geometry was stored.
    Applied,
    /// Same epoch as stored; reapplied idempotently.
    Reapplied,
    /// Older epoch than stored; discarded without effect.
    Stale,
}

/// Outcome of a marker upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerUpsert {
    Created,
    Updated,
}
