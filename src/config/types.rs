use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Site-Mirror
///
/// Every section is optional in the TOML file; missing values fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mirror: MirrorConfig,
    pub limits: LimitsConfig,
    pub progress: ProgressConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
}

/// What to mirror and where to put it
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Crawl origin and mirror scope
    #[serde(rename = "root-url")]
    pub root_url: String,

    /// Mirror destination directory
    #[serde(rename = "output-directory")]
    pub output_directory: PathBuf,

    /// Rewrite internal links to relative local paths before writing pages
    #[serde(rename = "rewrite-links")]
    pub rewrite_links: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            root_url: "https://books.toscrape.com/".to_string(),
            output_directory: PathBuf::from("./DownloadOutput"),
            rewrite_links: false,
        }
    }
}

/// Concurrency and retry limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-phase worker cap
    #[serde(rename = "max-parallel-activities")]
    pub max_parallel_activities: usize,

    /// Global cap on simultaneous in-flight requests
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: usize,

    /// Attempts per request; only timeouts consume extra attempts
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Per-attempt timeout (milliseconds)
    #[serde(rename = "per-request-timeout")]
    pub per_request_timeout: u64,

    /// Base delay between timed-out attempts (milliseconds)
    #[serde(rename = "retry-delay")]
    pub retry_delay: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_parallel_activities: 8,
            max_concurrent_requests: 16,
            max_retries: 5,
            per_request_timeout: 30_000,
            retry_delay: 500,
        }
    }
}

impl LimitsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.per_request_timeout)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }
}

/// Progress rendering and quiescence sampling
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Render progress bars on the terminal
    pub enabled: bool,

    /// Polling interval (milliseconds)
    pub interval: u64,

    /// Consecutive idle samples required before discovery is declared done
    #[serde(rename = "quiescence-samples")]
    pub quiescence_samples: u32,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: 100,
            quiescence_samples: 5,
        }
    }
}

impl ProgressConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: env!("CARGO_PKG_NAME").to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}
