//! Crawler module: the discovery and mirror engine
//!
//! This module contains the core mirroring logic, including:
//! - The HTTP transport and the shared fetch gate (limiter plus retries)
//! - The deduplicating frontier and the self-feeding discovery pool
//! - The mirror pool that writes pages and same-origin assets
//! - Progress rendering and quiescence detection
//! - Overall run coordination

mod context;
mod coordinator;
mod discovery;
mod frontier;
mod gate;
mod mirror;
mod parser;
mod progress;
mod rewrite;
mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use context::CrawlContext;
pub use coordinator::{run_mirror, Coordinator};
pub use discovery::{discover, DiscoveryPool};
pub use frontier::Frontier;
pub use gate::{FetchGate, FetchOutcome, RetryPolicy};
pub use mirror::mirror_pages;
pub use parser::{attribute_references, parse_page, AssetKind, AssetRef, ParsedPage};
pub use progress::{ProgressReporter, QuiescenceDetector};
pub use rewrite::rewrite_links;
pub use transport::{build_http_client, HttpTransport, Transport, TransportError};
