//! Site-Mirror: a concurrent website mirroring engine
//!
//! This crate discovers every in-site page reachable from a root URL and then
//! downloads each page together with its same-origin assets, reproducing the
//! site's path hierarchy on disk.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Worker pool error: {0}")]
    Pool(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Malformed URL: {0}")]
    Malformed(String),

    #[error("Unsupported reference: {0}")]
    Unsupported(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Errors reported by the fetch gate once its retry policy has run its course
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Fetch failed for {url}: {cause}")]
    Fatal {
        url: String,
        cause: crawler::TransportError,
    },

    #[error("Fetch exhausted for {url}: {attempts} attempts timed out")]
    Exhausted { url: String, attempts: u32 },

    #[error("Fetch gate closed while fetching {url}")]
    Closed { url: String },
}

/// Result type alias for Site-Mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_mirror, CrawlContext};
pub use output::MirrorSummary;
pub use crate::url::{map_mirror_path, resolve, same_origin, MirrorTarget};
