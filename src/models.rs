//! Data models for search requests, scraped candidates, and verdict payloads.
//!
//! This module defines the core data structures used throughout the service:
//! - [`SearchRequest`]: The JSON body accepted by `POST /search`
//! - [`Candidate`]: A raw title/link pair pulled out of a source's search page
//! - [`Article`]: A scored candidate attributed to its source
//! - [`SearchResponse`]: The verdict returned to the caller
//!
//! Everything here is request-scoped. Nothing outlives a single `/search` call.

use serde::{Deserialize, Serialize};

/// Message returned when the request carries no usable query.
pub const MSG_INVALID_INPUT: &str = "Không tìm thấy nội dung tra cứu.";
/// Message returned when every source came back empty.
pub const MSG_NOT_FOUND: &str = "Không tìm thấy nội dung liên quan trên các nguồn đáng tin cậy.";

/// The JSON body of a `POST /search` request.
///
/// `query` is kept as a raw JSON value so that absent, `null`, or
/// non-string queries are read as an empty query instead of failing
/// deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: serde_json::Value,
}

impl SearchRequest {
    /// The query text, or `""` when the field is missing or not a string.
    pub fn query_text(&self) -> &str {
        self.query.as_str().unwrap_or_default()
    }
}

/// A title/link pair located in a source's search results markup.
///
/// `url` is always absolute; relative links are resolved against the
/// source's origin during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub url: String,
}

/// A candidate that matched at least one query word.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Display name of the source the article was found on.
    pub name: String,
    /// The article headline as shown on the source.
    pub title: String,
    /// Absolute URL of the article.
    pub url: String,
    /// Number of distinct query words found as whole tokens in the title.
    pub relevance_score: u32,
}

/// How a [`SearchResponse`] came to be, used to pick the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// The query was empty or the body could not be read.
    InvalidInput,
    /// Sources were consulted (possibly with zero matches).
    #[default]
    Checked,
    /// The answer came from the canned-response table.
    Canned,
    /// Something unanticipated went wrong while checking.
    InternalError,
}

/// The verdict payload returned by `POST /search`.
///
/// `is_reliable` is tri-state: `true` when at least one corroborating
/// article was found, `false` when sources were checked and nothing
/// matched, and `null` when the check itself failed.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub message: String,
    pub is_reliable: Option<bool>,
    pub matched_sources: Vec<Article>,
    pub matching_articles_count: usize,
    pub contributing_sources_count: usize,
    #[serde(skip)]
    pub kind: ResponseKind,
}

impl SearchResponse {
    /// Negative answer for an empty or unreadable query.
    pub fn invalid_input() -> Self {
        Self {
            message: MSG_INVALID_INPUT.to_string(),
            is_reliable: Some(false),
            matched_sources: Vec::new(),
            matching_articles_count: 0,
            contributing_sources_count: 0,
            kind: ResponseKind::InvalidInput,
        }
    }

    /// Build the verdict from the aggregated, already sorted article list.
    ///
    /// `contributing_sources` is the number of distinct sources that
    /// supplied at least one article.
    pub fn from_articles(articles: Vec<Article>, contributing_sources: usize) -> Self {
        if articles.is_empty() {
            return Self {
                message: MSG_NOT_FOUND.to_string(),
                is_reliable: Some(false),
                matched_sources: Vec::new(),
                matching_articles_count: 0,
                contributing_sources_count: 0,
                kind: ResponseKind::Checked,
            };
        }

        let count = articles.len();
        Self {
            message: format!(
                "Tìm thấy {count} bài viết liên quan trên {contributing_sources} nguồn đáng tin cậy."
            ),
            is_reliable: Some(true),
            matched_sources: articles,
            matching_articles_count: count,
            contributing_sources_count: contributing_sources,
            kind: ResponseKind::Checked,
        }
    }

    /// "We don't know" answer for failures that escaped every source-level handler.
    pub fn internal_error(description: &str) -> Self {
        Self {
            message: format!("Có lỗi xảy ra: {description}"),
            is_reliable: None,
            matched_sources: Vec::new(),
            matching_articles_count: 0,
            contributing_sources_count: 0,
            kind: ResponseKind::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(name: &str, score: u32) -> Article {
        Article {
            name: name.to_string(),
            title: "Tiêu đề".to_string(),
            url: "https://example.com/a".to_string(),
            relevance_score: score,
        }
    }

    #[test]
    fn test_query_text_reads_string() {
        let req: SearchRequest = serde_json::from_str(r#"{"query": "bóng đá"}"#).unwrap();
        assert_eq!(req.query_text(), "bóng đá");
    }

    #[test]
    fn test_query_text_missing_or_wrong_type_is_empty() {
        let missing: SearchRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.query_text(), "");

        let null: SearchRequest = serde_json::from_str(r#"{"query": null}"#).unwrap();
        assert_eq!(null.query_text(), "");

        let number: SearchRequest = serde_json::from_str(r#"{"query": 42}"#).unwrap();
        assert_eq!(number.query_text(), "");
    }

    #[test]
    fn test_invalid_input_payload() {
        let resp = SearchResponse::invalid_input();
        assert_eq!(resp.is_reliable, Some(false));
        assert!(resp.matched_sources.is_empty());
        assert_eq!(resp.kind, ResponseKind::InvalidInput);
    }

    #[test]
    fn test_from_articles_reports_counts() {
        let resp = SearchResponse::from_articles(vec![article("VnExpress", 3), article("Tuổi Trẻ", 1)], 2);
        assert_eq!(resp.is_reliable, Some(true));
        assert_eq!(resp.matching_articles_count, 2);
        assert_eq!(resp.contributing_sources_count, 2);
        assert!(resp.message.contains("2 bài viết"));
    }

    #[test]
    fn test_from_no_articles_is_unreliable_not_error() {
        let resp = SearchResponse::from_articles(Vec::new(), 0);
        assert_eq!(resp.is_reliable, Some(false));
        assert_eq!(resp.matching_articles_count, 0);
        assert_eq!(resp.message, MSG_NOT_FOUND);
        assert_eq!(resp.kind, ResponseKind::Checked);
    }

    #[test]
    fn test_internal_error_serializes_null_reliability() {
        let resp = SearchResponse::internal_error("task panicked");
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["is_reliable"].is_null());
        assert_eq!(json["matching_articles_count"], 0);
        assert!(json["message"].as_str().unwrap().contains("task panicked"));
        assert!(json.get("kind").is_none());
    }
}
