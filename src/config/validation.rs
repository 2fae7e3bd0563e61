use crate::config::types::{
    Config, LimitsConfig, MirrorConfig, ProgressConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_mirror_config(&config.mirror)?;
    validate_limits_config(&config.limits)?;
    validate_progress_config(&config.progress)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates the root URL and output directory
fn validate_mirror_config(config: &MirrorConfig) -> Result<(), ConfigError> {
    let root = Url::parse(&config.root_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid root-url '{}': {}", config.root_url, e))
    })?;

    if root.scheme() != "http" && root.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' must use http or https",
            config.root_url
        )));
    }

    if root.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "root-url '{}' has no host",
            config.root_url
        )));
    }

    if config.output_directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output-directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates concurrency and retry limits
fn validate_limits_config(config: &LimitsConfig) -> Result<(), ConfigError> {
    if config.max_parallel_activities < 1 || config.max_parallel_activities > 256 {
        return Err(ConfigError::Validation(format!(
            "max-parallel-activities must be between 1 and 256, got {}",
            config.max_parallel_activities
        )));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 1024 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-requests must be between 1 and 1024, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.per_request_timeout < 1 {
        return Err(ConfigError::Validation(
            "per-request-timeout must be >= 1ms".to_string(),
        ));
    }

    Ok(())
}

fn validate_progress_config(config: &ProgressConfig) -> Result<(), ConfigError> {
    if config.interval < 1 {
        return Err(ConfigError::Validation(
            "progress interval must be >= 1ms".to_string(),
        ));
    }

    if config.quiescence_samples < 1 {
        return Err(ConfigError::Validation(format!(
            "quiescence-samples must be >= 1, got {}",
            config.quiescence_samples
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    Ok(())
}
