//! Routing backend client abstraction.
//!
//! The reconciler consumes three backend operations: the active route list,
//! routed (or straight-line fallback) geometry for a coordinate sequence,
//! and live vehicle positions. All three are behind the [`FleetApi`] trait
//! so tests can substitute scripted responses and controlled delays.
//!
//! Failures are transient by contract: callers keep whatever scene state
//! they already have and try again on the next cycle.

mod http;
mod types;

use futures::future::BoxFuture;
use thiserror::Error;

pub use http::HttpFleetApi;
pub use types::{LineString, Route, RouteStatus, RouteStop, VehiclePosition};

pub(crate) use types::GeometryResponse;

#[cfg(test)]
pub use http::tests::MockFleetApi;

/// Errors from the routing backend client.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("http request failed: {0}")]
    Http(String),

    /// The backend answered with a non-success status.
    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Client for the routing backend.
///
/// Methods return boxed futures so the trait stays object-safe; the
/// coordinator holds an `Arc<dyn FleetApi>` shared by both loaders.
pub trait FleetApi: Send + Sync {
    /// Fetch the current active route list.
    fn active_routes(&self) -> BoxFuture<'_, Result<Vec<Route>, ApiError>>;

    /// Request a routed geometry for an ordered `[lon, lat]` sequence.
    ///
    /// The backend guarantees a `LineString` result even without true road
    /// routing, via straight-line fallback.
    fn route_geometry<'a>(
        &'a self,
        coords: Vec<[f64; 2]>,
        profile: &'a str,
    ) -> BoxFuture<'a, Result<LineString, ApiError>>;

    /// Fetch live vehicle positions.
    ///
    /// `advance` asks the server to step its simulated vehicles forward,
    /// used for demonstration setups.
    fn live_positions(&self, advance: bool) -> BoxFuture<'_, Result<Vec<VehiclePosition>, ApiError>>;
}
