//! Mirror phase: pages plus their same-origin assets
//!
//! Each page in the frozen frontier is one unit of work. A unit fetches the
//! page unless it is already on disk, writes it, and then mirrors the page's
//! assets one after another. Assets are not scanned for further references.

use crate::crawler::{parse_page, rewrite_links, CrawlContext, ProgressReporter};
use crate::state::WorkItem;
use crate::url::{map_mirror_path, resolve, same_origin, MirrorTarget};
use crate::MirrorError;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Mirrors every page and waits until each one has finished
///
/// Per-URL failures are logged and counted, never returned.
pub async fn mirror_pages(
    ctx: &CrawlContext,
    pages: Vec<Url>,
    reporter: &ProgressReporter,
) -> crate::Result<()> {
    ctx.storage.ensure_root().await?;
    tracing::info!(
        "Mirroring {} pages into {}",
        pages.len(),
        ctx.storage.root().display()
    );

    let total = pages.len() as u64;
    let (result, _) = tokio::join!(run_pool(ctx, pages), reporter.watch_mirror(total));
    result
}

async fn run_pool(ctx: &CrawlContext, pages: Vec<Url>) -> crate::Result<()> {
    let slots = Arc::new(Semaphore::new(ctx.max_parallel()));
    let mut workers = JoinSet::new();
    let mut closed = false;

    for url in pages {
        ctx.counters.mirror_started();
        let guard = ctx.counters.finish_mirror_on_drop();

        // A closed pool still finishes every item so the reporter can stop.
        let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
            closed = true;
            continue;
        };

        let ctx = ctx.clone();
        workers.spawn(async move {
            let _guard = guard;
            let _permit = permit;
            mirror_page(&ctx, &WorkItem::page(url)).await;
        });
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Mirror worker failed: {}", e);
        }
    }

    if closed {
        return Err(MirrorError::Pool("mirror pool closed early".to_string()));
    }
    Ok(())
}

async fn mirror_page(ctx: &CrawlContext, item: &WorkItem) {
    let url = &item.url;
    let target = map_mirror_path(url, &ctx.root);

    let (html, base) = if ctx.storage.exists(&target).await {
        tracing::debug!("Skipping {}, already mirrored", url);
        ctx.counters.page_skipped();
        let body = match ctx.storage.read(&target).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Cannot rescan {} for assets: {}", url, e);
                return;
            }
        };
        (body, rescan_base(ctx, url, &target))
    } else {
        match fetch_page(ctx, url, &target).await {
            Some(body) => (body, url.clone()),
            None => return,
        }
    };

    for asset in collect_assets(ctx, &base, &String::from_utf8_lossy(&html)) {
        mirror_asset(ctx, &WorkItem::asset(asset, url.clone())).await;
    }
}

/// Base for references in a stored copy
///
/// A rewritten copy holds links relative to its own file, which for a
/// slashless directory URL differs from the page URL.
fn rescan_base(ctx: &CrawlContext, url: &Url, target: &MirrorTarget) -> Url {
    if !ctx.config.mirror.rewrite_links {
        return url.clone();
    }
    match target.local_url(&ctx.root) {
        Ok(local) => local,
        Err(e) => {
            tracing::debug!("No local URL for {}: {}", url, e);
            url.clone()
        }
    }
}

/// Fetches and writes a page; `None` if either step failed
async fn fetch_page(ctx: &CrawlContext, url: &Url, target: &MirrorTarget) -> Option<Vec<u8>> {
    let body = match ctx.gate.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to fetch page {}: {}", url, e);
            ctx.counters.failure();
            return None;
        }
    };

    let written = if ctx.config.mirror.rewrite_links {
        let rewritten = rewrite_links(&String::from_utf8_lossy(&body), url, &ctx.root);
        ctx.storage.write(target, rewritten.as_bytes()).await
    } else {
        ctx.storage.write(target, &body).await
    };

    match written {
        Ok(path) => {
            tracing::debug!("Mirrored {} to {}", url, path.display());
            ctx.counters.page_written();
            Some(body)
        }
        Err(e) => {
            tracing::warn!("Failed to store page {}: {}", url, e);
            ctx.counters.failure();
            None
        }
    }
}

/// Resolves a page's asset references, keeping same-origin URLs once each
fn collect_assets(ctx: &CrawlContext, page: &Url, html: &str) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut assets = Vec::new();

    for asset in parse_page(html).assets {
        match resolve(page, &asset.reference) {
            Ok(url) if same_origin(&ctx.root, &url) => {
                if seen.insert(url.clone()) {
                    assets.push(url);
                }
            }
            Ok(url) => {
                tracing::trace!("Ignoring {:?} on another origin: {}", asset.kind, url);
                ctx.counters.asset_rejected();
            }
            Err(e) => tracing::debug!("Dropping asset reference on {}: {}", page, e),
        }
    }

    assets
}

async fn mirror_asset(ctx: &CrawlContext, item: &WorkItem) {
    let url = &item.url;
    let owner = item.owner().map(Url::as_str).unwrap_or_default();

    if !ctx.assets.claim_if_new(url) {
        ctx.counters.asset_skipped();
        return;
    }

    let target = map_mirror_path(url, &ctx.root);
    if ctx.storage.exists(&target).await {
        ctx.counters.asset_skipped();
        return;
    }

    let body = match ctx.gate.fetch(url).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to fetch asset {} (on {}): {}", url, owner, e);
            ctx.counters.failure();
            return;
        }
    };

    match ctx.storage.write(&target, &body).await {
        Ok(path) => {
            tracing::trace!("Mirrored asset {} to {}", url, path.display());
            ctx.counters.asset_written();
        }
        Err(e) => {
            tracing::warn!("Failed to store asset {} (on {}): {}", url, owner, e);
            ctx.counters.failure();
        }
    }
}
