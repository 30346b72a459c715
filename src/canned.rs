//! Canned verdicts for specific literal queries.
//!
//! Some queries have an editorially fixed answer. They are listed in an
//! optional YAML file and consulted before any source is fetched:
//!
//! ```yaml
//! "Bão số 3 đổ bộ Hà Nội":
//!   message: "Tin đã được xác nhận."
//!   is_reliable: true
//!   matched_sources:
//!     - name: VnExpress
//!       title: "Bão số 3 đổ bộ Hà Nội"
//!       url: "https://vnexpress.net/bao-so-3.html"
//!       relevance_score: 6
//! ```
//!
//! Keys are matched after normalization, so case, diacritics and
//! surrounding or repeated whitespace do not matter.

use crate::config::ConfigError;
use crate::models::{Article, ResponseKind, SearchResponse};
use crate::utils::tokenize;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::fs;
use tracing::{debug, info, instrument};

/// A fixed answer returned verbatim for one query.
///
/// `matching_articles_count` and `contributing_sources_count` are derived
/// from `matched_sources` when the answer is served.
#[derive(Debug, Clone, Deserialize)]
pub struct CannedVerdict {
    pub message: String,
    /// `null` in the file serves an "unknown" verdict.
    pub is_reliable: Option<bool>,
    #[serde(default)]
    pub matched_sources: Vec<Article>,
}

/// Lookup table from normalized query to canned verdict.
#[derive(Debug, Default)]
pub struct CannedResponses {
    entries: HashMap<String, CannedVerdict>,
}

impl CannedResponses {
    /// Build a table from literal queries.
    pub fn new(entries: HashMap<String, CannedVerdict>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(query, verdict)| (key(&query), verdict))
                .collect(),
        }
    }

    /// Parse a YAML mapping of query to [`CannedVerdict`].
    ///
    /// # Arguments
    ///
    /// * `yaml` - Document text in the shape shown in the module docs
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the document is not such a mapping.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let entries: HashMap<String, CannedVerdict> = serde_yaml::from_str(yaml)?;
        Ok(Self::new(entries))
    }

    /// Read and parse the canned responses file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if it does not parse.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::Read(path.to_string(), e))?;
        let table = Self::parse(&yaml)?;
        info!(count = table.len(), "Loaded canned responses");
        Ok(table)
    }

    /// Number of canned queries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no canned answers are configured.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The canned verdict for `query`, if one is registered.
    pub fn lookup(&self, query: &str) -> Option<SearchResponse> {
        let verdict = self.entries.get(&key(query))?;
        debug!("Answering from canned responses");
        let sources = verdict.matched_sources.iter().map(|a| a.name.as_str()).unique().count();
        Some(SearchResponse {
            message: verdict.message.clone(),
            is_reliable: verdict.is_reliable,
            matched_sources: verdict.matched_sources.clone(),
            matching_articles_count: verdict.matched_sources.len(),
            contributing_sources_count: sources,
            kind: ResponseKind::Canned,
        })
    }
}

fn key(query: &str) -> String {
    tokenize(query).join(" ")
}
