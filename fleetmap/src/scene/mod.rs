//! Scene Store - the authoritative map of rendered entities.
//!
//! This module holds the current set of markers and line layers, keyed by
//! stable identifier. Upserts are idempotent; geometry upserts are gated by
//! refresh epoch so that asynchronous results resolving out of order can
//! never roll the scene back to an older state.
//!
//! # Design
//!
//! **The store is the authority. The surface is a projection.**
//!
//! - **Store**: entities and their epochs, behind short-lived locks
//! - **Mirror**: accepted mutations forwarded to the bound [`RenderSurface`]
//! - **Never trust arrival order**: only the epoch decides which geometry wins

mod model;
mod store;

pub use model::{
    layer_id, source_id, LayerRecord, LayerUpsert, MarkerUpsert, RouteGeometry, VehicleMarker,
    LAYER_ID_PREFIX, SOURCE_ID_PREFIX,
};
pub use store::SceneStore;
