//! In-memory transport used by the crawler's unit tests

use crate::config::Config;
use crate::crawler::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// A fake site: fixed bodies per URL plus scripted failures
#[derive(Debug, Default)]
pub struct FakeSite {
    bodies: HashMap<String, Vec<u8>>,
    failures: Mutex<HashMap<String, VecDeque<TransportError>>>,
    calls: Mutex<HashMap<String, usize>>,
    total_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    latency: Duration,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn page(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.bodies.insert(url.to_string(), body.into());
        self
    }

    /// Queues failures returned, in order, before the body is served
    pub fn fail(self, url: &str, errors: Vec<TransportError>) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(url.to_string(), errors.into());
        self
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeSite {
    async fn get(&self, url: &Url, _timeout: Duration) -> Result<Vec<u8>, TransportError> {
        let key = url.as_str().to_string();
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().unwrap().entry(key.clone()).or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let scripted = self
            .failures
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|queue| queue.pop_front());
        if let Some(error) = scripted {
            return Err(error);
        }

        self.bodies
            .get(&key)
            .cloned()
            .ok_or(TransportError::Status(404))
    }
}

/// Configuration tuned for fast tests
pub fn test_config(root: &str, output: &Path, parallel: usize) -> Config {
    let mut config = Config::default();
    config.mirror.root_url = root.to_string();
    config.mirror.output_directory = output.to_path_buf();
    config.limits.max_parallel_activities = parallel;
    config.limits.max_concurrent_requests = 16;
    config.limits.max_retries = 3;
    config.limits.per_request_timeout = 1_000;
    config.limits.retry_delay = 1;
    config.progress.enabled = false;
    config.progress.interval = 5;
    config.progress.quiescence_samples = 3;
    config
}

/// Wraps links into a minimal HTML page
pub fn html_with_links(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>", href))
        .collect();
    format!("<html><body>{}</body></html>", anchors)
}
