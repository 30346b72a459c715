//! The set of news sources consulted for every query.
//!
//! The built-in list covers four Vietnamese outlets. A YAML file with the
//! same shape can replace it at startup:
//!
//! ```yaml
//! - name: VnExpress
//!   url_template: "https://timkiem.vnexpress.net/?q={query}"
//! - name: VietnamNet
//!   url_template: "https://vietnamnet.vn/tim-kiem/{query}.html"
//! ```
//!
//! A source's `name` also selects its extraction rule
//! (see [`crate::scrapers::rules`]).

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, instrument};

/// One news site and the search URL used to query it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub name: String,
    /// Search URL containing a `{query}` placeholder.
    pub url_template: String,
}

impl SourceConfig {
    /// Create a source entry.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name, also used to pick the extraction rule
    /// * `url_template` - Search URL with a `{query}` placeholder
    pub fn new(name: &str, url_template: &str) -> Self {
        Self {
            name: name.to_string(),
            url_template: url_template.to_string(),
        }
    }
}

/// The built-in trusted sources.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::new("VnExpress", "https://timkiem.vnexpress.net/?q={query}"),
        SourceConfig::new("Thanh Niên", "https://thanhnien.vn/tim-kiem/?q={query}"),
        SourceConfig::new("Tuổi Trẻ", "https://tuoitre.vn/tim-kiem.html?q={query}"),
        SourceConfig::new("VietnamNet", "https://vietnamnet.vn/tim-kiem/{query}.html"),
    ]
}

/// Parse a YAML source list.
pub fn parse_sources(yaml: &str) -> Result<Vec<SourceConfig>, ConfigError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Read a YAML source list from disk.
#[instrument(level = "info")]
pub async fn load_sources(path: &str) -> Result<Vec<SourceConfig>, ConfigError> {
    let yaml = fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Read(path.to_string(), e))?;
    let sources = parse_sources(&yaml)?;
    info!(count = sources.len(), "Loaded sources file");
    Ok(sources)
}
