//! End-of-run statistics
//!
//! The summary is assembled from the shared counters once both phases are
//! over and printed by the binary.

use crate::state::CounterSnapshot;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Outcome of one mirror run
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorSummary {
    /// Crawl origin and mirror scope
    pub root_url: String,

    /// Where the mirror was written
    pub output_directory: PathBuf,

    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,

    /// Total time spent in both phases
    pub duration: Duration,

    /// Size of the frozen frontier
    pub pages_discovered: u64,

    pub pages_written: u64,
    pub pages_skipped: u64,
    pub assets_written: u64,
    pub assets_skipped: u64,

    /// Asset references to another origin, counted per occurrence
    pub assets_rejected: u64,

    /// Pages or assets that could not be fetched or stored
    pub failures: u64,

    /// Pages that could not be fetched while discovering
    pub discovery_failures: u64,

    /// Network attempts issued, retries included
    pub requests_issued: u64,
}

impl MirrorSummary {
    pub fn from_snapshot(
        root: &Url,
        output_directory: impl Into<PathBuf>,
        started_at: DateTime<Utc>,
        duration: Duration,
        pages_discovered: u64,
        snapshot: &CounterSnapshot,
        requests_issued: u64,
    ) -> Self {
        Self {
            root_url: root.to_string(),
            output_directory: output_directory.into(),
            started_at,
            duration,
            pages_discovered,
            pages_written: snapshot.pages_written,
            pages_skipped: snapshot.pages_skipped,
            assets_written: snapshot.assets_written,
            assets_skipped: snapshot.assets_skipped,
            assets_rejected: snapshot.assets_rejected,
            failures: snapshot.failures,
            discovery_failures: snapshot.discovery_failures,
            requests_issued,
        }
    }

    /// True when every page and asset made it to disk
    pub fn is_complete(&self) -> bool {
        self.failures == 0 && self.pages_written + self.pages_skipped == self.pages_discovered
    }

    /// Share of discovered pages present in the mirror, in percent
    pub fn page_coverage(&self) -> f64 {
        if self.pages_discovered == 0 {
            return 0.0;
        }
        (self.pages_written + self.pages_skipped) as f64 / self.pages_discovered as f64 * 100.0
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &MirrorSummary) {
    println!("=== Mirror Summary ===\n");

    println!("Run:");
    println!("  Root: {}", summary.root_url);
    println!("  Output: {}", summary.output_directory.display());
    println!(
        "  Started: {}",
        summary.started_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Duration: {:.1}s", summary.duration.as_secs_f64());
    println!("  Requests issued: {}", summary.requests_issued);
    println!();

    println!("Pages:");
    println!("  Discovered: {}", summary.pages_discovered);
    println!("  Written: {}", summary.pages_written);
    println!("  Already mirrored: {}", summary.pages_skipped);
    if summary.discovery_failures > 0 {
        println!("  Unreachable during discovery: {}", summary.discovery_failures);
    }
    println!();

    println!("Assets:");
    println!("  Written: {}", summary.assets_written);
    println!("  Already mirrored: {}", summary.assets_skipped);
    println!("  Other origin (ignored): {}", summary.assets_rejected);
    println!();

    if summary.failures > 0 {
        println!("Failures: {} (see log for details)", summary.failures);
        println!();
    }

    println!(
        "Coverage: {:.1}% ({} / {} pages mirrored)",
        summary.page_coverage(),
        summary.pages_written + summary.pages_skipped,
        summary.pages_discovered
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(snapshot: &CounterSnapshot, discovered: u64) -> MirrorSummary {
        MirrorSummary::from_snapshot(
            &Url::parse("https://example.com/").unwrap(),
            "/tmp/mirror",
            Utc::now(),
            Duration::from_millis(1500),
            discovered,
            snapshot,
            12,
        )
    }

    #[test]
    fn test_summary_from_snapshot() {
        let snapshot = CounterSnapshot {
            pages_written: 3,
            pages_skipped: 1,
            assets_written: 5,
            assets_rejected: 2,
            ..CounterSnapshot::default()
        };

        let summary = summary(&snapshot, 4);
        assert_eq!(summary.root_url, "https://example.com/");
        assert_eq!(summary.assets_written, 5);
        assert_eq!(summary.requests_issued, 12);
        assert!(summary.is_complete());
        assert_eq!(summary.page_coverage(), 100.0);
    }

    #[test]
    fn test_failures_make_summary_incomplete() {
        let snapshot = CounterSnapshot {
            pages_written: 1,
            failures: 1,
            ..CounterSnapshot::default()
        };

        let summary = summary(&snapshot, 2);
        assert!(!summary.is_complete());
        assert_eq!(summary.page_coverage(), 50.0);
    }

    #[test]
    fn test_empty_run_has_zero_coverage() {
        let summary = summary(&CounterSnapshot::default(), 0);
        assert_eq!(summary.page_coverage(), 0.0);
        print_summary(&summary);
    }
}
