//! Wire types for the routing backend.
//!
//! These mirror the JSON payloads of the routing service. The backend sends
//! more than the reconciler needs (driver names, ETAs, utilization figures
//! for the dashboard panels); unknown fields are ignored on deserialize.

use serde::{Deserialize, Serialize};

/// Lifecycle status of an active route.
///
/// Unrecognized statuses fold into [`RouteStatus::Unknown`] rather than
/// failing the whole route list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Active,
    Planned,
    Delayed,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A single stop on a route.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteStop {
    pub lat: f64,
    pub lon: f64,
    /// Display name, e.g. the franchise location.
    #[serde(default)]
    pub name: Option<String>,
    /// Per-stop delivery status (completed/active/pending).
    #[serde(default)]
    pub status: Option<String>,
}

/// An active route as reported by `GET /routing/active-routes`.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    pub id: String,
    /// Vehicle assigned to this route, when known.
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub status: RouteStatus,
    /// Ordered delivery stops. Routes with fewer than two stops have no
    /// drawable path.
    #[serde(default)]
    pub stops: Vec<RouteStop>,
}

impl Route {
    /// Stop coordinates as `[lon, lat]` pairs, the order the geometry
    /// endpoint expects.
    pub fn stop_coordinates(&self) -> Vec<[f64; 2]> {
        self.stops.iter().map(|s| [s.lon, s.lat]).collect()
    }
}

/// A GeoJSON LineString as returned by the geometry endpoint.
///
/// The backend guarantees a result even without a road network, via a
/// straight-line fallback between the requested coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineString {
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
}

impl LineString {
    /// Whether this is a drawable line: correctly typed with at least two
    /// coordinates.
    pub fn is_drawable(&self) -> bool {
        self.kind == "LineString" && self.coordinates.len() >= 2
    }
}

/// Envelope of `POST /routing/route-geometry`.
#[derive(Debug, Deserialize)]
pub(crate) struct GeometryResponse {
    pub geometry: LineString,
}

/// A live vehicle position from `GET /routing/live-positions`.
#[derive(Debug, Clone, Deserialize)]
pub struct VehiclePosition {
    pub vehicle_id: String,
    pub lat: f64,
    pub lon: f64,
    /// RFC 3339 timestamp of the last server-side update, when provided.
    #[serde(default)]
    pub last_update: Option<String>,
}
