//! HTTP surface: a single `POST /search` endpoint.
//!
//! | Outcome | Status | `is_reliable` |
//! |---------|--------|---------------|
//! | Empty, missing or unreadable query | 400 | `false` |
//! | Sources checked, articles found | 200 | `true` |
//! | Sources checked, nothing found | 200 | `false` |
//! | Canned answer | 200 | as configured |
//! | Unanticipated failure | 500 | `null` |
//!
//! Any origin may call the endpoint.

use crate::canned::CannedResponses;
use crate::models::{ResponseKind, SearchRequest, SearchResponse};
use crate::search::Checker;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinError;
use tower_http::cors::{self, CorsLayer};
use tracing::{error, info, instrument};

/// Shared state for axum handlers.
pub struct AppState<S> {
    pub searcher: Arc<S>,
    pub canned: Arc<CannedResponses>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            searcher: Arc::clone(&self.searcher),
            canned: Arc::clone(&self.canned),
        }
    }
}

/// Build the router with permissive CORS.
pub fn router<S: Checker>(state: AppState<S>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(cors::Any)
        .allow_methods(cors::Any)
        .allow_headers(cors::Any);

    Router::new()
        .route("/search", post(search_handler::<S>))
        .layer(cors_layer)
        .with_state(state)
}

/// Bind `host:port` and serve until Ctrl-C.
pub async fn serve<S: Checker>(
    host: &str,
    port: u16,
    state: AppState<S>,
) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    let local_addr = listener.local_addr()?;
    info!(%local_addr, "news_check listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[instrument(level = "info", skip_all)]
async fn search_handler<S: Checker>(
    State(state): State<AppState<S>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> (StatusCode, Json<SearchResponse>) {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            info!(reason = %rejection.body_text(), "Unreadable request body");
            return respond(SearchResponse::invalid_input());
        }
    };

    let query = request.query_text().trim().to_string();
    if query.is_empty() {
        info!("Empty query");
        return respond(SearchResponse::invalid_input());
    }

    if let Some(canned) = state.canned.lookup(&query) {
        return respond(canned);
    }

    let searcher = Arc::clone(&state.searcher);
    let response = match tokio::spawn(async move { searcher.check(&query).await }).await {
        Ok(response) => response,
        Err(e) => internal_error(e),
    };
    respond(response)
}

fn respond(response: SearchResponse) -> (StatusCode, Json<SearchResponse>) {
    (status_for(response.kind), Json(response))
}

fn status_for(kind: ResponseKind) -> StatusCode {
    match kind {
        ResponseKind::InvalidInput => StatusCode::BAD_REQUEST,
        ResponseKind::Checked | ResponseKind::Canned => StatusCode::OK,
        ResponseKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a failed search task to the "unknown" verdict.
fn internal_error(e: JoinError) -> SearchResponse {
    let description = if e.is_panic() {
        panic_message(e.into_panic())
    } else {
        "search was cancelled".to_string()
    };
    error!(error = %description, "Search task failed");
    SearchResponse::internal_error(&description)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "internal error".to_string()
    }
}
