//! In-memory [`Transport`] used by unit tests.

use crate::fetch::{FetchError, Transport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

enum Route {
    Page(String),
    Slow { delay: Duration, body: String },
    Fail,
    Flaky { remaining: AtomicUsize, body: String },
    Panic,
}

/// Serves canned pages keyed by a URL fragment.
///
/// The first route whose fragment occurs in the requested URL wins.
/// Unrouted URLs answer 404.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: Vec<(String, Route)>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn page(mut self, fragment: &str, html: &str) -> Self {
        self.routes.push((fragment.to_string(), Route::Page(html.to_string())));
        self
    }

    /// Serves `html` after `delay`.
    pub(crate) fn slow(mut self, fragment: &str, delay: Duration, html: &str) -> Self {
        self.routes.push((
            fragment.to_string(),
            Route::Slow {
                delay,
                body: html.to_string(),
            },
        ));
        self
    }

    /// Every request answers 503.
    pub(crate) fn failing(mut self, fragment: &str) -> Self {
        self.routes.push((fragment.to_string(), Route::Fail));
        self
    }

    /// Answers 503 `failures` times, then serves `html`.
    pub(crate) fn flaky(mut self, fragment: &str, failures: usize, html: &str) -> Self {
        self.routes.push((
            fragment.to_string(),
            Route::Flaky {
                remaining: AtomicUsize::new(failures),
                body: html.to_string(),
            },
        ));
        self
    }

    pub(crate) fn panicking(mut self, fragment: &str) -> Self {
        self.routes.push((fragment.to_string(), Route::Panic));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most requests that were ever outstanding at the same moment.
    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn respond(&self, url: &str) -> Result<String, FetchError> {
        let Some((_, route)) = self.routes.iter().find(|(fragment, _)| url.contains(fragment.as_str())) else {
            return Err(FetchError::Status(404));
        };
        match route {
            Route::Page(html) => Ok(html.clone()),
            Route::Slow { delay, body } => {
                tokio::time::sleep(*delay).await;
                Ok(body.clone())
            }
            Route::Fail => Err(FetchError::Status(503)),
            Route::Flaky { remaining, body } => {
                let left = remaining.load(Ordering::SeqCst);
                if left > 0 {
                    remaining.store(left - 1, Ordering::SeqCst);
                    Err(FetchError::Status(503))
                } else {
                    Ok(body.clone())
                }
            }
            Route::Panic => panic!("transport exploded for {url}"),
        }
    }
}

impl Transport for FakeTransport {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        let result = self.respond(url).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
