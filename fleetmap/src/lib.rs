//! Fleetmap - live delivery-fleet map reconciliation
//!
//! This library merges two independently polled, asynchronous data sources
//! (computed route geometries and live vehicle positions) into one
//! persistent visual scene, without flicker, duplicate entities, stale
//! overwrites, or leaks across mount/unmount.
//!
//! # Architecture
//!
//! ```text
//!                 ┌───────────────────┐
//!                 │  MapCoordinator   │  mount / unmount lifecycle
//!                 └──┬─────────────┬──┘
//!                    ▼             ▼
//!        ┌────────────────┐ ┌────────────────┐
//!        │ GeometryLoader │ │ PositionPoller │   independent loops
//!        └───────┬────────┘ └───────┬────────┘
//!                ▼                  ▼
//!               ┌────────────────────┐
//!               │     SceneStore     │  epoch-gated, idempotent upserts
//!               └─────────┬──────────┘
//!                         ▼
//!               ┌────────────────────┐
//!               │   RenderSurface    │  one adapter per map technology
//!               └────────────────────┘
//! ```
//!
//! The backend (route planning, position simulation) is consumed through
//! the [`api::FleetApi`] trait; the map library is driven through the
//! [`surface::RenderSurface`] capability. Neither side is implemented here
//! beyond an HTTP client and the adapters shipped with the CLI.

pub mod api;
pub mod config;
pub mod coordinator;
pub mod loader;
pub mod metrics;
pub mod poller;
pub mod scene;
pub mod surface;

/// Crate version, from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
