//! Runtime configuration assembled once at startup.
//!
//! [`AppConfig`] is built from the parsed [`Cli`], validated, and then shared
//! read-only with the fetcher and the orchestrator.

use crate::cli::Cli;
use crate::fetch::{MAX_RESPONSE_BYTES, QUERY_PLACEHOLDER, RetryPolicy};
use crate::scrapers::rule_for;
use crate::sources::{SourceConfig, default_sources, load_sources};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    Read(String, #[source] std::io::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything the service needs to answer `/search`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub sources: Vec<SourceConfig>,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    /// Maximum articles kept from any one source.
    pub per_source_cap: usize,
    /// Query sources concurrently instead of one after another.
    pub concurrent: bool,
    /// Upper bound on sources in flight at once in concurrent mode.
    pub max_concurrent_sources: usize,
    /// Upper bound on a fetched page body.
    pub max_body_bytes: usize,
    pub canned_file: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            sources: default_sources(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            per_source_cap: 5,
            concurrent: true,
            max_concurrent_sources: 4,
            max_body_bytes: MAX_RESPONSE_BYTES,
            canned_file: None,
        }
    }
}

impl AppConfig {
    /// Build and validate the configuration, reading the sources file if one was given.
    pub async fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let sources = match cli.sources_file.as_deref() {
            Some(path) => load_sources(path).await?,
            None => default_sources(),
        };

        let config = Self {
            host: cli.host.clone(),
            port: cli.port,
            sources,
            timeout: Duration::from_secs(cli.timeout_secs),
            retry: RetryPolicy {
                max_retries: cli.max_retries,
                base_delay: Duration::from_millis(cli.base_delay_ms),
                ..RetryPolicy::default()
            },
            per_source_cap: cli.per_source_cap,
            concurrent: !cli.sequential,
            max_concurrent_sources: cli.max_concurrent_sources,
            max_body_bytes: cli.max_body_bytes,
            canned_file: cli.canned_file.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks:
    /// - `timeout` must be greater than 0
    /// - `per_source_cap` must be greater than 0
    /// - `max_concurrent_sources` must be greater than 0
    /// - `max_body_bytes` must be greater than 0
    /// - `sources` must not be empty
    /// - every `url_template` must contain `{query}`
    ///
    /// Sources without an extraction rule are allowed but logged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be greater than 0".into()));
        }
        if self.per_source_cap == 0 {
            return Err(ConfigError::Invalid(
                "per_source_cap must be greater than 0".into(),
            ));
        }
        if self.max_concurrent_sources == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_sources must be greater than 0".into(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_body_bytes must be greater than 0".into(),
            ));
        }
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one source must be configured".into(),
            ));
        }
        for source in &self.sources {
            if !source.url_template.contains(QUERY_PLACEHOLDER) {
                return Err(ConfigError::Invalid(format!(
                    "source {} url_template lacks {QUERY_PLACEHOLDER}",
                    source.name
                )));
            }
            if rule_for(&source.name).is_none() {
                warn!(source = %source.name, "No extraction rule; source will never contribute articles");
            }
        }
        Ok(())
    }
}
