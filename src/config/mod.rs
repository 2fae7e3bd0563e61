//! Configuration module for Site-Mirror
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional; command-line overrides are merged by the binary
//! and the result is checked with [`validate`].
//!
//! # Example
//!
//! ```no_run
//! use site_mirror::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("mirror.toml")).unwrap();
//! println!("Workers per phase: {}", config.limits.max_parallel_activities);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, LimitsConfig, MirrorConfig, ProgressConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, read_config_with_hash,
};
pub use validation::validate;
