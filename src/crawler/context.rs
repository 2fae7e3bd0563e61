use crate::config::Config;
use crate::crawler::{FetchGate, Frontier, HttpTransport, Transport};
use crate::state::Counters;
use crate::storage::FsStorage;
use std::sync::Arc;
use url::Url;

/// Everything a worker needs, shared across both phases
///
/// Cloning is cheap; all shared state sits behind `Arc`s.
#[derive(Clone)]
pub struct CrawlContext {
    pub config: Arc<Config>,

    /// Crawl origin and mirror scope, without fragment
    pub root: Url,

    pub gate: FetchGate,

    /// Pages claimed during discovery
    pub frontier: Arc<Frontier>,

    /// Assets claimed during mirroring, so shared assets are fetched once
    pub assets: Arc<Frontier>,

    pub counters: Arc<Counters>,
    pub storage: FsStorage,
}

impl CrawlContext {
    /// Builds a context backed by the real HTTP transport
    pub fn from_config(config: &Config) -> crate::Result<Self> {
        let transport = HttpTransport::from_config(&config.user_agent)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Builds a context around any transport
    pub fn with_transport(config: &Config, transport: Arc<dyn Transport>) -> crate::Result<Self> {
        let mut root = Url::parse(&config.mirror.root_url)?;
        root.set_fragment(None);

        Ok(Self {
            config: Arc::new(config.clone()),
            root,
            gate: FetchGate::from_limits(transport, &config.limits),
            frontier: Arc::new(Frontier::new()),
            assets: Arc::new(Frontier::new()),
            counters: Counters::new(),
            storage: FsStorage::new(&config.mirror.output_directory),
        })
    }

    pub fn max_parallel(&self) -> usize {
        self.config.limits.max_parallel_activities.max(1)
    }
}
