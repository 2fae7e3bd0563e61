//! Self-feeding discovery pool
//!
//! Workers fetch a page, claim every same-origin link in the frontier and
//! push newly claimed URLs back onto the pool's queue. The queue is explicit
//! and unbounded; the pool only bounds how many items run at once.
//!
//! Every queued item travels with its `FinishGuard`, so an item counts as
//! finished on every path: processed, failed, panicked or dropped unread.
//! Children are queued while their parent's guard is still alive, which keeps
//! `started > finished` until the whole subtree is done.

use crate::crawler::{parse_page, CrawlContext, ProgressReporter};
use crate::state::{FinishGuard, WorkItem};
use crate::url::resolve_in_scope;
use crate::{MirrorError, UrlError};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use url::Url;

type Queue = mpsc::UnboundedSender<(WorkItem, FinishGuard)>;

/// Bounded pool of discovery workers fed by its own queue
pub struct DiscoveryPool {
    ctx: CrawlContext,
    queue: Queue,
    stop: Option<oneshot::Sender<()>>,
    dispatcher: JoinHandle<()>,
}

impl DiscoveryPool {
    /// Starts the dispatcher; nothing runs until a URL is submitted
    pub fn spawn(ctx: CrawlContext) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let (stop, stop_rx) = oneshot::channel();
        let dispatcher = tokio::spawn(dispatch(ctx.clone(), queue.clone(), rx, stop_rx));

        Self {
            ctx,
            queue,
            stop: Some(stop),
            dispatcher,
        }
    }

    /// Claims `url` and queues it; false if it was already claimed
    pub fn submit(&self, url: Url) -> bool {
        enqueue(&self.ctx, &self.queue, url)
    }

    /// Stops the dispatcher and waits for running workers
    pub async fn shutdown(mut self) -> crate::Result<()> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.dispatcher
            .await
            .map_err(|e| MirrorError::Pool(format!("discovery dispatcher failed: {}", e)))
    }
}

/// Runs discovery from the root until quiescence
///
/// # Returns
///
/// The frozen frontier's URLs, sorted. Pages whose fetch failed are still
/// included; the mirror phase gets its own attempt at them.
pub async fn discover(ctx: &CrawlContext, reporter: &ProgressReporter) -> crate::Result<Vec<Url>> {
    tracing::info!("Discovering pages from {}", ctx.root);

    let pool = DiscoveryPool::spawn(ctx.clone());
    pool.submit(ctx.root.clone());

    let snapshot = reporter.watch_discovery().await;
    pool.shutdown().await?;
    ctx.frontier.freeze();

    let pages = ctx.frontier.snapshot();
    tracing::info!(
        "Discovered {} pages ({} could not be fetched)",
        pages.len(),
        snapshot.discovery_failures
    );
    Ok(pages)
}

fn enqueue(ctx: &CrawlContext, queue: &Queue, url: Url) -> bool {
    if !ctx.frontier.claim_if_new(&url) {
        return false;
    }

    ctx.counters.discovery_started();
    let guard = ctx.counters.finish_discovery_on_drop();
    if let Err(mpsc::error::SendError((item, _guard))) =
        queue.send((WorkItem::discover(url), guard))
    {
        tracing::debug!("Discovery queue closed, dropping {}", item.url);
    }
    true
}

async fn dispatch(
    ctx: CrawlContext,
    queue: Queue,
    mut rx: mpsc::UnboundedReceiver<(WorkItem, FinishGuard)>,
    mut stop: oneshot::Receiver<()>,
) {
    let slots = Arc::new(Semaphore::new(ctx.max_parallel()));
    let mut workers = JoinSet::new();

    loop {
        tokio::select! {
            _ = &mut stop => break,
            Some((item, guard)) = rx.recv() => {
                let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
                    break;
                };
                let ctx = ctx.clone();
                let queue = queue.clone();
                workers.spawn(async move {
                    let _guard = guard;
                    let _permit = permit;
                    discover_page(&ctx, &queue, &item).await;
                });
            }
            Some(joined) = workers.join_next(), if !workers.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!("Discovery worker failed: {}", e);
                }
            }
        }
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Discovery worker failed: {}", e);
        }
    }
}

async fn discover_page(ctx: &CrawlContext, queue: &Queue, item: &WorkItem) {
    let body = match ctx.gate.fetch(&item.url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Discovery failed for {}: {}", item.url, e);
            ctx.counters.discovery_failure();
            return;
        }
    };

    let links = parse_page(&String::from_utf8_lossy(&body)).links;
    let mut claimed = 0usize;

    for link in &links {
        match resolve_in_scope(&item.url, link, &ctx.root) {
            Ok(Some(url)) => {
                if enqueue(ctx, queue, url) {
                    claimed += 1;
                }
            }
            Ok(None) | Err(UrlError::Unsupported(_)) => {}
            Err(e) => tracing::debug!("Dropping link on {}: {}", item.url, e),
        }
    }

    tracing::trace!(
        "{} {}: {} links, {} new",
        item.role,
        item.url,
        links.len(),
        claimed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::testing::{html_with_links, test_config, FakeSite};
    use crate::crawler::TransportError;
    use std::time::Duration;
    use tempfile::TempDir;

    const ROOT: &str = "https://example.com/";

    /// Ten pages in a ring with back-edges to the root and some noise links
    fn ring_site() -> FakeSite {
        let mut site = FakeSite::new().with_latency(Duration::from_millis(2));
        site = site.page(
            ROOT,
            html_with_links(&["/p1/", "/p2/", "https://other.com/", "mailto:me@example.com"]),
        );
        for i in 1..=9 {
            let next = format!("/p{}/", i % 9 + 1);
            site = site.page(
                &format!("{}p{}/", ROOT, i),
                html_with_links(&[next.as_str(), "/", "#top", "http://[::1"]),
            );
        }
        site
    }

    async fn run_discovery(site: FakeSite, parallel: usize) -> (CrawlContext, Vec<Url>) {
        let dir = TempDir::new().unwrap();
        let config = test_config(ROOT, dir.path(), parallel);
        let ctx = CrawlContext::with_transport(&config, Arc::new(site)).unwrap();
        let reporter = ProgressReporter::new(Arc::clone(&ctx.counters), &config.progress);

        let pages = discover(&ctx, &reporter).await.unwrap();
        (ctx, pages)
    }

    #[tokio::test]
    async fn test_finite_graph_single_worker() {
        let (ctx, pages) = run_discovery(ring_site(), 1).await;
        assert_eq!(pages.len(), 10);
        assert!(ctx.frontier.is_frozen());
        assert!(ctx.counters.snapshot().discovery_idle());
    }

    #[tokio::test]
    async fn test_finite_graph_eight_workers() {
        let (ctx, pages) = run_discovery(ring_site(), 8).await;
        assert_eq!(pages.len(), 10);
        assert_eq!(ctx.counters.snapshot().discovery_started, 10);
        assert_eq!(ctx.counters.snapshot().discovery_failures, 0);
    }

    #[tokio::test]
    async fn test_each_page_fetched_once() {
        let site = Arc::new(ring_site());
        let dir = TempDir::new().unwrap();
        let config = test_config(ROOT, dir.path(), 8);
        let ctx = CrawlContext::with_transport(&config, site.clone()).unwrap();
        let reporter = ProgressReporter::new(Arc::clone(&ctx.counters), &config.progress);

        discover(&ctx, &reporter).await.unwrap();
        assert_eq!(site.total_calls(), 10);
        assert_eq!(site.calls("https://other.com/"), 0);
    }

    #[tokio::test]
    async fn test_failed_pages_do_not_stall_discovery() {
        let site = FakeSite::new()
            .page(ROOT, html_with_links(&["/missing/", "/ok/", "/refused/"]))
            .page("https://example.com/ok/", html_with_links(&[]))
            .page("https://example.com/refused/", "")
            .fail(
                "https://example.com/refused/",
                vec![TransportError::Connect("refused".to_string())],
            );

        let (ctx, pages) = run_discovery(site, 4).await;
        let snapshot = ctx.counters.snapshot();
        assert_eq!(pages.len(), 4);
        assert_eq!(snapshot.discovery_failures, 2);
        assert!(snapshot.discovery_idle());
    }

    #[tokio::test]
    async fn test_unreachable_root() {
        let (ctx, pages) = run_discovery(FakeSite::new(), 2).await;
        assert_eq!(pages, vec![Url::parse(ROOT).unwrap()]);
        assert_eq!(ctx.counters.snapshot().discovery_failures, 1);
    }

    #[tokio::test]
    async fn test_submit_rejects_claimed_url() {
        let dir = TempDir::new().unwrap();
        let config = test_config(ROOT, dir.path(), 1);
        let ctx = CrawlContext::with_transport(&config, Arc::new(FakeSite::new())).unwrap();

        let pool = DiscoveryPool::spawn(ctx.clone());
        let root = Url::parse(ROOT).unwrap();
        assert!(pool.submit(root.clone()));
        assert!(!pool.submit(root));
        pool.shutdown().await.unwrap();
    }
}
