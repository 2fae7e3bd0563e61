//! Crawler coordinator - runs the two phases in order
//!
//! 1. Discovery from the root until quiescence
//! 2. Mirroring of the frozen frontier
//! 3. Summary from the shared counters

use crate::config::Config;
use crate::crawler::{discover, mirror_pages, CrawlContext, ProgressReporter, Transport};
use crate::output::MirrorSummary;
use std::sync::Arc;
use std::time::Instant;

/// Main mirror coordinator
pub struct Coordinator {
    ctx: CrawlContext,
    reporter: ProgressReporter,
}

impl Coordinator {
    /// Creates a coordinator using the HTTP transport
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MirrorError)` - Root URL did not parse or the client failed to build
    pub fn new(config: Config) -> crate::Result<Self> {
        Ok(Self::from_context(CrawlContext::from_config(&config)?))
    }

    /// Creates a coordinator around a caller-supplied transport
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> crate::Result<Self> {
        Ok(Self::from_context(CrawlContext::with_transport(
            &config, transport,
        )?))
    }

    fn from_context(ctx: CrawlContext) -> Self {
        let reporter = ProgressReporter::new(Arc::clone(&ctx.counters), &ctx.config.progress);
        Self { ctx, reporter }
    }

    pub fn context(&self) -> &CrawlContext {
        &self.ctx
    }

    /// Runs discovery then mirroring
    ///
    /// A coordinator is good for one run; its frontier is frozen afterwards.
    pub async fn run(&self) -> crate::Result<MirrorSummary> {
        let started_at = chrono::Utc::now();
        let start_time = Instant::now();
        tracing::info!(
            "Mirroring {} into {}",
            self.ctx.root,
            self.ctx.storage.root().display()
        );

        let pages = discover(&self.ctx, &self.reporter).await?;
        let discovered = pages.len() as u64;
        mirror_pages(&self.ctx, pages, &self.reporter).await?;

        let summary = MirrorSummary::from_snapshot(
            &self.ctx.root,
            self.ctx.storage.root(),
            started_at,
            start_time.elapsed(),
            discovered,
            &self.ctx.counters.snapshot(),
            self.ctx.gate.attempts_issued(),
        );

        tracing::info!(
            "Mirror completed: {} pages, {} assets, {} failures in {:?}",
            summary.pages_written + summary.pages_skipped,
            summary.assets_written + summary.assets_skipped,
            summary.failures,
            summary.duration
        );
        Ok(summary)
    }
}

/// Runs a complete mirror with the given configuration
pub async fn run_mirror(config: Config) -> crate::Result<MirrorSummary> {
    Coordinator::new(config)?.run().await
}
