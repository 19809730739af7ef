//! CLI error type.

use thiserror::Error;

use fleetmap::api::ApiError;
use fleetmap::config::ConfigError;
use fleetmap::coordinator::MountError;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("backend client error: {0}")]
    Api(#[from] ApiError),

    #[error("mount failed: {0}")]
    Mount(#[from] MountError),
}
