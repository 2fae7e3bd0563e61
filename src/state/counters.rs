//! Shared progress counters
//!
//! Workers only ever increment these; the progress reporter and the
//! coordinator read them freely.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Atomic counters shared by both worker pools
#[derive(Debug, Default)]
pub struct Counters {
    discovery_started: AtomicU64,
    discovery_finished: AtomicU64,
    mirror_started: AtomicU64,
    mirror_finished: AtomicU64,

    pages_written: AtomicU64,
    pages_skipped: AtomicU64,
    assets_written: AtomicU64,
    assets_skipped: AtomicU64,
    assets_rejected: AtomicU64,
    failures: AtomicU64,
    discovery_failures: AtomicU64,
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub discovery_started: u64,
    pub discovery_finished: u64,
    pub mirror_started: u64,
    pub mirror_finished: u64,
    pub pages_written: u64,
    pub pages_skipped: u64,
    pub assets_written: u64,
    pub assets_skipped: u64,
    pub assets_rejected: u64,
    pub failures: u64,
    pub discovery_failures: u64,
}

impl CounterSnapshot {
    /// Discovery items accepted but not yet finished
    pub fn discovery_in_flight(&self) -> u64 {
        self.discovery_started.saturating_sub(self.discovery_finished)
    }

    /// True when every accepted discovery item has finished
    pub fn discovery_idle(&self) -> bool {
        self.discovery_started == self.discovery_finished
    }
}

impl Counters {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn discovery_started(&self) {
        self.discovery_started.fetch_add(1, Ordering::SeqCst);
    }

    pub fn mirror_started(&self) {
        self.mirror_started.fetch_add(1, Ordering::SeqCst);
    }

    pub fn page_written(&self) {
        self.pages_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn page_skipped(&self) {
        self.pages_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn asset_written(&self) {
        self.assets_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn asset_skipped(&self) {
        self.assets_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn asset_rejected(&self) {
        self.assets_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// A page or asset could not be mirrored
    pub fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A page could not be fetched while discovering
    pub fn discovery_failure(&self) {
        self.discovery_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a guard that marks one discovery item finished when dropped
    pub fn finish_discovery_on_drop(self: &Arc<Self>) -> FinishGuard {
        FinishGuard {
            counters: Arc::clone(self),
            phase: Phase::Discovery,
        }
    }

    /// Returns a guard that marks one mirror item finished when dropped
    pub fn finish_mirror_on_drop(self: &Arc<Self>) -> FinishGuard {
        FinishGuard {
            counters: Arc::clone(self),
            phase: Phase::Mirror,
        }
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        // Finished is read before started so a snapshot never shows more
        // finished than started items.
        let discovery_finished = self.discovery_finished.load(Ordering::SeqCst);
        let discovery_started = self.discovery_started.load(Ordering::SeqCst);
        let mirror_finished = self.mirror_finished.load(Ordering::SeqCst);
        let mirror_started = self.mirror_started.load(Ordering::SeqCst);

        CounterSnapshot {
            discovery_started,
            discovery_finished,
            mirror_started,
            mirror_finished,
            pages_written: self.pages_written.load(Ordering::Relaxed),
            pages_skipped: self.pages_skipped.load(Ordering::Relaxed),
            assets_written: self.assets_written.load(Ordering::Relaxed),
            assets_skipped: self.assets_skipped.load(Ordering::Relaxed),
            assets_rejected: self.assets_rejected.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            discovery_failures: self.discovery_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Discovery,
    Mirror,
}

/// Increments a phase's finished counter exactly once, on drop
///
/// Workers hold one of these for the whole unit of work so the counter
/// advances on every exit path, panics included.
#[derive(Debug)]
pub struct FinishGuard {
    counters: Arc<Counters>,
    phase: Phase,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        let counter = match self.phase {
            Phase::Discovery => &self.counters.discovery_finished,
            Phase::Mirror => &self.counters.mirror_finished,
        };
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counters_are_idle() {
        let counters = Counters::new();
        let snapshot = counters.snapshot();
        assert!(snapshot.discovery_idle());
        assert_eq!(snapshot, CounterSnapshot::default());
    }

    #[test]
    fn test_guard_finishes_on_drop() {
        let counters = Counters::new();
        counters.discovery_started();
        let guard = counters.finish_discovery_on_drop();

        assert!(!counters.snapshot().discovery_idle());
        assert_eq!(counters.snapshot().discovery_in_flight(), 1);

        drop(guard);
        assert!(counters.snapshot().discovery_idle());
    }

    #[test]
    fn test_mirror_guard_counts_once() {
        let counters = Counters::new();
        counters.mirror_started();
        {
            let _guard = counters.finish_mirror_on_drop();
        }
        let snapshot = counters.snapshot();
        assert_eq!(snapshot.mirror_started, 1);
        assert_eq!(snapshot.mirror_finished, 1);
        assert_eq!(snapshot.discovery_finished, 0);
    }

    #[test]
    fn test_guard_finishes_when_worker_panics() {
        let counters = Counters::new();
        counters.discovery_started();

        let worker_counters = Arc::clone(&counters);
        let result = std::thread::spawn(move || {
            let _guard = worker_counters.finish_discovery_on_drop();
            panic!("worker failed");
        })
        .join();

        assert!(result.is_err());
        assert!(counters.snapshot().discovery_idle());
    }

    #[test]
    fn test_outcome_tallies() {
        let counters = Counters::new();
        counters.page_written();
        counters.page_skipped();
        counters.asset_written();
        counters.asset_written();
        counters.asset_rejected();
        counters.failure();
        counters.discovery_failure();

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.pages_written, 1);
        assert_eq!(snapshot.pages_skipped, 1);
        assert_eq!(snapshot.assets_written, 2);
        assert_eq!(snapshot.assets_skipped, 0);
        assert_eq!(snapshot.assets_rejected, 1);
        assert_eq!(snapshot.failures, 1);
        assert_eq!(snapshot.discovery_failures, 1);
    }
}
