//! Watch command - mount the live map against a backend and stream it to
//! the console until interrupted.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tracing::info;

use fleetmap::api::HttpFleetApi;
use fleetmap::config::MapConfig;
use fleetmap::coordinator::MapCoordinator;

use crate::error::CliError;
use crate::surface::ConsoleSurface;

/// Interval between status summary lines.
const STATUS_INTERVAL: Duration = Duration::from_secs(10);

/// Arguments for the watch command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Routing backend base URL (overrides config file).
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Live position poll interval in seconds.
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Route geometry refresh interval in seconds.
    #[arg(long)]
    pub refresh_interval: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl-C.
    #[arg(long)]
    pub duration: Option<u64>,

    /// Do not ask the server to step its simulated vehicles.
    #[arg(long)]
    pub no_advance: bool,

    /// Path to an INI config file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the watch command.
pub async fn run(args: WatchArgs) -> Result<(), CliError> {
    // Resolution order: CLI > config file > defaults.
    let mut config = match &args.config {
        Some(path) => MapConfig::from_ini_file(path)?,
        None => MapConfig::default(),
    };
    if let Some(url) = args.backend_url {
        config = config.with_backend_url(url);
    }
    if let Some(secs) = args.poll_interval {
        config = config.with_poll_interval(Duration::from_secs(secs));
    }
    if let Some(secs) = args.refresh_interval {
        config = config.with_refresh_interval(Duration::from_secs(secs));
    }
    if args.no_advance {
        config.advance_positions = false;
    }

    info!(
        backend = %config.backend_url,
        poll_secs = config.poll_interval.as_secs(),
        refresh_secs = config.refresh_interval.as_secs(),
        "Starting live map watch"
    );

    let api = Arc::new(HttpFleetApi::new(&config.backend_url)?);
    let mut coordinator = MapCoordinator::new(api, config);
    coordinator.mount(Arc::new(ConsoleSurface::new())).await?;

    let deadline = args.duration.map(Duration::from_secs);
    wait_for_shutdown(&coordinator, deadline).await;

    coordinator.unmount().await;
    let snapshot = coordinator.metrics_snapshot();
    info!(
        refreshes = snapshot.refreshes_completed,
        polls = snapshot.polls_completed,
        ticks_skipped = snapshot.ticks_skipped,
        stale_dropped = snapshot.stale_geometries_dropped,
        "Watch finished"
    );
    Ok(())
}

/// Block until Ctrl-C or the optional deadline, logging a status summary at
/// a fixed interval.
async fn wait_for_shutdown(coordinator: &MapCoordinator, deadline: Option<Duration>) {
    let sleep_for = deadline.unwrap_or(Duration::MAX);
    let timeout = tokio::time::sleep(sleep_for);
    tokio::pin!(timeout);

    let mut status = tokio::time::interval(STATUS_INTERVAL);
    status.tick().await; // first tick is immediate; skip it

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, unmounting");
                break;
            }
            _ = &mut timeout => {
                info!("Watch duration elapsed, unmounting");
                break;
            }
            _ = status.tick() => {
                let snapshot = coordinator.metrics_snapshot();
                let store = coordinator.store();
                info!(
                    markers = store.marker_count(),
                    layers = store.layer_count(),
                    polls = snapshot.polls_completed,
                    refreshes = snapshot.refreshes_completed,
                    "Scene status"
                );
            }
        }
    }
}
