//! Console progress and discovery termination
//!
//! The reporter only reads counters. During discovery it also decides when
//! the phase is over, because the same polling loop that renders the spinner
//! is the one that samples for quiescence.

use crate::config::ProgressConfig;
use crate::state::{CounterSnapshot, Counters};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

const SPINNER_TEMPLATE: &str = "{spinner:.green} Discovering [{elapsed_precise}] {pos} pages found, {msg}";
const BAR_TEMPLATE: &str =
    "Mirroring [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Debounced rendezvous on the discovery counters
///
/// Quiescence is declared once the phase is idle (started == finished) and
/// the started count has not moved for `required` consecutive samples.
#[derive(Debug, Clone)]
pub struct QuiescenceDetector {
    required: u32,
    stable: u32,
    last_started: Option<u64>,
}

impl QuiescenceDetector {
    pub fn new(required: u32) -> Self {
        Self {
            required: required.max(1),
            stable: 0,
            last_started: None,
        }
    }

    /// Feeds one sample; returns true once discovery is quiescent
    pub fn observe(&mut self, snapshot: &CounterSnapshot) -> bool {
        let unchanged = self.last_started == Some(snapshot.discovery_started);
        self.last_started = Some(snapshot.discovery_started);

        self.stable = match (snapshot.discovery_idle(), unchanged) {
            (false, _) => 0,
            (true, true) => self.stable + 1,
            (true, false) => 1,
        };
        self.stable >= self.required
    }
}

/// Polls the shared counters and renders progress
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    counters: Arc<Counters>,
    interval: Duration,
    samples: u32,
    enabled: bool,
}

impl ProgressReporter {
    pub fn new(counters: Arc<Counters>, config: &ProgressConfig) -> Self {
        Self {
            counters,
            interval: config.interval(),
            samples: config.quiescence_samples,
            enabled: config.enabled,
        }
    }

    /// Shows an open-ended spinner until discovery is quiescent
    ///
    /// Returns the snapshot that satisfied the quiescence test.
    pub async fn watch_discovery(&self) -> CounterSnapshot {
        let bar = self.bar(ProgressBar::new_spinner(), SPINNER_TEMPLATE);
        let mut detector = QuiescenceDetector::new(self.samples);
        let mut ticker = self.ticker();

        loop {
            ticker.tick().await;
            let snapshot = self.counters.snapshot();

            bar.set_position(snapshot.discovery_started);
            bar.set_message(format!("{} in flight", snapshot.discovery_in_flight()));
            bar.tick();

            if detector.observe(&snapshot) {
                bar.finish_with_message("done");
                tracing::debug!(
                    "Discovery quiescent after {} pages ({} failed)",
                    snapshot.discovery_started,
                    snapshot.discovery_failures
                );
                return snapshot;
            }
        }
    }

    /// Shows a bar until `total` mirror items have finished
    pub async fn watch_mirror(&self, total: u64) -> CounterSnapshot {
        let bar = self.bar(ProgressBar::new(total), BAR_TEMPLATE);
        let mut ticker = self.ticker();

        loop {
            let snapshot = self.counters.snapshot();
            bar.set_position(snapshot.mirror_finished.min(total));
            bar.set_message(format!(
                "{} assets, {} failed",
                snapshot.assets_written, snapshot.failures
            ));

            if snapshot.mirror_finished >= total {
                bar.finish();
                return snapshot;
            }
            ticker.tick().await;
        }
    }

    fn bar(&self, bar: ProgressBar, template: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.with_style(style)
    }

    fn ticker(&self) -> tokio::time::Interval {
        let mut ticker = tokio::time::interval(self.interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    }
}
