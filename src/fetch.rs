//! Fetching source search pages with exponential backoff retry logic.
//!
//! # Architecture
//!
//! The module uses a trait-based design so the retry loop can be tested
//! without a network:
//! - [`Transport`]: Core trait defining a single async GET
//! - [`HttpTransport`]: `reqwest`-backed implementation with User-Agent rotation
//! - [`RetryFetch`]: Decorator that adds a bounded retry policy to any `Transport`
//!
//! # Retry Strategy
//!
//! - Non-2xx statuses, network errors and timeouts are all retried
//! - Exponential backoff starting at [`RetryPolicy::base_delay`]
//! - Delay capped at [`RetryPolicy::max_delay`]
//! - Random jitter added to spread out concurrent retries
//!
//! Once retries are exhausted the failure is logged and the source simply
//! contributes nothing; see [`fetch_source`].

use rand::{Rng, rng};
use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Realistic desktop browser User-Agent strings, rotated per request.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Placeholder substituted with the URL-encoded query in source templates.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Default cap on a search page body; larger pages are abandoned unread.
pub const MAX_RESPONSE_BYTES: usize = 5_000_000;

/// Why a single GET produced no page.
///
/// Every variant is retryable from [`RetryFetch`]'s point of view except
/// [`FetchError::InvalidUrl`], which [`fetch_source`] reports before any
/// request is made.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The source's URL template did not produce a usable http(s) URL.
    #[error("invalid search URL: {0}")]
    InvalidUrl(String),

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// The body exceeded the transport's byte limit.
    #[error("response too large (>{0} bytes)")]
    TooLarge(usize),

    /// Connection, TLS, timeout or body-read failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A single HTTP GET returning the response body as text.
///
/// Implementations report non-2xx responses as [`FetchError::Status`].
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// `reqwest`-backed [`Transport`] that picks a random User-Agent per request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpTransport {
    /// Build a client for fetching source search pages.
    ///
    /// # Arguments
    ///
    /// * `timeout` - Limit for one whole request, body included
    /// * `max_body_bytes` - Pages larger than this fail with [`FetchError::TooLarge`]
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the TLS backend cannot be initialised.
    pub fn new(timeout: Duration, max_body_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            max_body_bytes,
        })
    }
}

impl Transport for HttpTransport {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let mut response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, random_user_agent())
            .header(reqwest::header::ACCEPT_LANGUAGE, "vi-VN,vi;q=0.9,en;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length()
            && len > self.max_body_bytes as u64
        {
            return Err(FetchError::TooLarge(self.max_body_bytes));
        }

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            bytes.extend_from_slice(&chunk);
            if bytes.len() > self.max_body_bytes {
                return Err(FetchError::TooLarge(self.max_body_bytes));
            }
        }
        let body = String::from_utf8_lossy(&bytes).into_owned();
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Select a random User-Agent string from the rotation list.
pub fn random_user_agent() -> &'static str {
    USER_AGENTS[rng().random_range(0..USER_AGENTS.len())]
}

/// Bounded retry policy with exponential backoff.
///
/// The delay before retry `n` (1-based) is:
/// ```text
/// delay = min(base_delay * multiplier^(n-1), max_delay) + random_jitter(0..=max_jitter)
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: usize,
    pub base_delay: Duration,
    pub multiplier: u32,
    pub max_delay: Duration,
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            multiplier: 2,
            max_delay: Duration::from_secs(30),
            max_jitter: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (1-based), without jitter.
    pub fn backoff(&self, retry: usize) -> Duration {
        let exp = u32::try_from(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        let factor = self.multiplier.saturating_pow(exp);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn delay_for(&self, retry: usize) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rng().random_range(0..=jitter_ms))
        };
        self.backoff(retry) + jitter
    }
}

/// Wrapper that adds bounded retries with exponential backoff to any [`Transport`].
pub struct RetryFetch<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryFetch<T> {
    /// Wrap `inner` so every [`Transport::get`] is retried under `policy`.
    ///
    /// # Arguments
    ///
    /// * `inner` - The transport doing the actual requests
    /// * `policy` - How many retries to allow and how long to wait between them
    ///
    /// # Returns
    ///
    /// A [`Transport`] that only fails once `policy.max_retries` retries have failed.
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    #[cfg(test)]
    pub(crate) fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("policy", &self.policy)
            .finish()
    }
}

impl<T: Transport> Transport for RetryFetch<T> {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut retry = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.get(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    retry += 1;
                    let elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64;
                    let elapsed_ms_total = total_t0.elapsed().as_millis() as u64;

                    if retry > self.policy.max_retries {
                        error!(
                            attempts = retry,
                            elapsed_ms_attempt,
                            elapsed_ms_total,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.policy.delay_for(retry);
                    warn!(
                        attempt = retry,
                        max = self.policy.max_retries,
                        elapsed_ms_attempt,
                        elapsed_ms_total,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Substitute the URL-encoded `query` into `template` and validate the result.
pub fn build_search_url(template: &str, query: &str) -> Result<String, FetchError> {
    if !template.contains(QUERY_PLACEHOLDER) {
        return Err(FetchError::InvalidUrl(format!(
            "template has no {QUERY_PLACEHOLDER} placeholder: {template}"
        )));
    }
    let url = template.replace(QUERY_PLACEHOLDER, &urlencoding::encode(query));
    let parsed = Url::parse(&url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl(format!("unsupported scheme {other}: {url}"))),
    }
}

/// Fetch one source's search page for `query`.
///
/// Returns `None` when the template is malformed or the transport gave up.
/// Failures are logged here and never reach the caller.
#[instrument(level = "info", skip_all, fields(source = %source_name))]
pub async fn fetch_source<T: Transport>(
    transport: &T,
    template: &str,
    query: &str,
    source_name: &str,
) -> Option<String> {
    let url = match build_search_url(template, query) {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "Skipping source with unusable search URL");
            return None;
        }
    };

    match transport.get(&url).await {
        Ok(html) => {
            debug!(%url, bytes = html.len(), "Fetched search page");
            Some(html)
        }
        Err(e) => {
            warn!(%url, error = %e, "Source unavailable; contributing no articles");
            None
        }
    }
}
