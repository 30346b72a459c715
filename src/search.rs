//! Search orchestration across all configured sources.
//!
//! # Pipeline
//!
//! 1. Reject an empty query with the invalid-input verdict
//! 2. Normalize the query into distinct words
//! 3. For each source: fetch, extract, score, drop non-matches, keep the top N
//! 4. Merge every source's articles and stable-sort by relevance
//! 5. Build the verdict from the merged list
//!
//! Each source runs in its own task. A source that times out, errors, or
//! panics contributes nothing and never affects the others. In concurrent
//! mode at most `max_concurrent_sources` tasks run at once, so with no more
//! sources than that the request takes roughly as long as the slowest one.

use crate::config::AppConfig;
use crate::fetch::{RetryFetch, Transport, fetch_source};
use crate::models::{Article, SearchResponse};
use crate::scoring::{rank_candidates, sort_by_relevance};
use crate::scrapers::extract;
use crate::sources::SourceConfig;
use crate::utils::{query_words, truncate_for_log};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// Turns a query into a verdict; the HTTP handler only depends on this.
pub trait Checker: Send + Sync + 'static {
    fn check(&self, query: &str) -> impl Future<Output = SearchResponse> + Send;
}

/// Checks queries against a fixed set of sources.
pub struct Searcher<T> {
    transport: Arc<RetryFetch<T>>,
    sources: Vec<SourceConfig>,
    per_source_cap: usize,
    concurrent: bool,
    max_concurrent_sources: usize,
}

impl<T: Transport + 'static> Searcher<T> {
    /// Wrap `transport` in the configured retry policy.
    pub fn new(transport: T, config: &AppConfig) -> Self {
        Self {
            transport: Arc::new(RetryFetch::new(transport, config.retry.clone())),
            sources: config.sources.clone(),
            per_source_cap: config.per_source_cap,
            concurrent: config.concurrent,
            max_concurrent_sources: config.max_concurrent_sources.max(1),
        }
    }

    /// The sources every query is checked against, in merge order.
    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &RetryFetch<T> {
        &self.transport
    }

    /// Check `query` against every source and build the verdict.
    ///
    /// Never fails: upstream problems reduce to "no articles from that source",
    /// and an empty query yields [`SearchResponse::invalid_input`].
    #[instrument(level = "info", skip_all, fields(sources = self.sources.len(), concurrent = self.concurrent))]
    pub async fn search(&self, query: &str) -> SearchResponse {
        let query = query.trim();
        let words = Arc::new(query_words(query));
        if words.is_empty() {
            info!("Rejected empty query");
            return SearchResponse::invalid_input();
        }
        debug!(query, words = ?words, "Checking query");

        // Tasks are spawned as the stream is polled, so no more than
        // `max_concurrent_sources` exist at once. `buffered` yields in
        // configuration order.
        let per_source: Vec<Vec<Article>> = if self.concurrent {
            stream::iter(0..self.sources.len())
                .map(|i| {
                    let source = &self.sources[i];
                    let handle = self.spawn_source(source, query, &words);
                    let name = source.name.clone();
                    async move { join_source(&name, handle).await }
                })
                .buffered(self.max_concurrent_sources)
                .collect()
                .await
        } else {
            let mut results = Vec::with_capacity(self.sources.len());
            for source in &self.sources {
                let handle = self.spawn_source(source, query, &words);
                results.push(join_source(&source.name, handle).await);
            }
            results
        };

        let mut articles: Vec<Article> = per_source.into_iter().flatten().collect();
        sort_by_relevance(&mut articles);
        let contributing = articles.iter().map(|a| a.name.as_str()).unique().count();

        info!(
            articles = articles.len(),
            contributing_sources = contributing,
            "Search complete"
        );
        SearchResponse::from_articles(articles, contributing)
    }

    fn spawn_source(
        &self,
        source: &SourceConfig,
        query: &str,
        words: &Arc<Vec<String>>,
    ) -> JoinHandle<Vec<Article>> {
        tokio::spawn(check_source(
            Arc::clone(&self.transport),
            source.clone(),
            query.to_string(),
            Arc::clone(words),
            self.per_source_cap,
        ))
    }
}

impl<T: Transport + 'static> Checker for Searcher<T> {
    fn check(&self, query: &str) -> impl Future<Output = SearchResponse> + Send {
        self.search(query)
    }
}

/// Fetch, extract and rank one source.
async fn check_source<T: Transport>(
    transport: Arc<RetryFetch<T>>,
    source: SourceConfig,
    query: String,
    words: Arc<Vec<String>>,
    cap: usize,
) -> Vec<Article> {
    let Some(html) = fetch_source(transport.as_ref(), &source.url_template, &query, &source.name).await
    else {
        return Vec::new();
    };

    let candidates = extract(&source.name, &html);
    if candidates.is_empty() {
        debug!(
            source = %source.name,
            preview = %truncate_for_log(&html, 300),
            "No candidates extracted; markup may have changed"
        );
    }

    let found = candidates.len();
    let articles = rank_candidates(&source.name, candidates, &words, cap);
    info!(source = %source.name, found, kept = articles.len(), "Source checked");
    articles
}

async fn join_source(source_name: &str, handle: JoinHandle<Vec<Article>>) -> Vec<Article> {
    match handle.await {
        Ok(articles) => articles,
        Err(e) => {
            error!(source = source_name, error = %e, "Source task failed; contributing no articles");
            Vec::new()
        }
    }
}
