//! Reconciler metrics for observability and user feedback.
//!
//! Lock-free atomic counters recorded by the loaders, copied out as a
//! point-in-time [`MetricsSnapshot`] for display (the CLI logs one per
//! status interval).

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared by the geometry loader and position poller.
#[derive(Debug, Default)]
pub struct ReconcilerMetrics {
    refreshes_completed: AtomicU64,
    route_list_failures: AtomicU64,
    geometry_failures: AtomicU64,
    geometries_malformed: AtomicU64,
    stale_geometries_dropped: AtomicU64,
    polls_completed: AtomicU64,
    poll_failures: AtomicU64,
    ticks_skipped: AtomicU64,
}

impl ReconcilerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_completed(&self) {
        self.refreshes_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn route_list_failed(&self) {
        self.route_list_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn geometry_failed(&self) {
        self.geometry_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn geometry_malformed(&self) {
        self.geometries_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn stale_geometry_dropped(&self) {
        self.stale_geometries_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn poll_completed(&self) {
        self.polls_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn poll_failed(&self) {
        self.poll_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tick_skipped(&self) {
        self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            refreshes_completed: self.refreshes_completed.load(Ordering::Relaxed),
            route_list_failures: self.route_list_failures.load(Ordering::Relaxed),
            geometry_failures: self.geometry_failures.load(Ordering::Relaxed),
            geometries_malformed: self.geometries_malformed.load(Ordering::Relaxed),
            stale_geometries_dropped: self.stale_geometries_dropped.load(Ordering::Relaxed),
            polls_completed: self.polls_completed.load(Ordering::Relaxed),
            poll_failures: self.poll_failures.load(Ordering::Relaxed),
            ticks_skipped: self.ticks_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the reconciler counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub refreshes_completed: u64,
    pub route_list_failures: u64,
    pub geometry_failures: u64,
    pub geometries_malformed: u64,
    pub stale_geometries_dropped: u64,
    pub polls_completed: u64,
    pub poll_failures: u64,
    pub ticks_skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics_snapshot_is_zeroed() {
        let metrics = ReconcilerMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate_independently() {
        let metrics = ReconcilerMetrics::new();
        metrics.refresh_completed();
        metrics.refresh_completed();
        metrics.poll_completed();
        metrics.tick_skipped();
        metrics.stale_geometry_dropped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.refreshes_completed, 2);
        assert_eq!(snapshot.polls_completed, 1);
        assert_eq!(snapshot.ticks_skipped, 1);
        assert_eq!(snapshot.stale_geometries_dropped, 1);
        assert_eq!(snapshot.poll_failures, 0);
    }
}
