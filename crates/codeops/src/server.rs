//! HTTP host for the two services.
//!
//! `POST /fetch-github-repo` and `POST /analyze-code` answer with the same
//! envelopes and `{ "error": message }` bodies the pipeline's
//! [`HttpClient`](codeops_pipeline::HttpClient) expects. CORS is permissive so
//! a browser dashboard on another origin can call the services directly.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use codeops_ai::{ActionError, ActionHandler};
use codeops_github::{FetchError, RepoFetcher, RepoSource};
use codeops_protocol::{ActionResponse, ErrorBody, FetchRepoResponse};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub const FETCH_ROUTE: &str = "/fetch-github-repo";
pub const ACTION_ROUTE: &str = "/analyze-code";
pub const HEALTH_ROUTE: &str = "/health";

pub struct ServiceState<S> {
    pub fetcher: RepoFetcher<S>,
    pub actions: ActionHandler,
}

/// An error response: status code plus `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: u16, message: String) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message,
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

impl From<ActionError> for ApiError {
    fn from(err: ActionError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{} {}", self.status.as_u16(), self.message);
        } else {
            tracing::warn!("{} {}", self.status.as_u16(), self.message);
        }
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

pub fn router<S: RepoSource + 'static>(fetcher: RepoFetcher<S>, actions: ActionHandler) -> Router {
    let state = Arc::new(ServiceState { fetcher, actions });
    Router::new()
        .route(FETCH_ROUTE, post(fetch_repository::<S>))
        .route(ACTION_ROUTE, post(run_action::<S>))
        .route(HEALTH_ROUTE, get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bodies are parsed leniently: an unreadable body is treated as an empty
/// one so the handlers answer with their own 400 message.
fn body_json(body: &Bytes) -> Value {
    serde_json::from_slice(body).unwrap_or(Value::Null)
}

async fn fetch_repository<S: RepoSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    body: Bytes,
) -> Result<Json<FetchRepoResponse>, ApiError> {
    let body = body_json(&body);
    let repo_url = body.get("repoUrl").and_then(Value::as_str).unwrap_or_default();

    let fetched = state.fetcher.fetch(repo_url).await?;
    tracing::info!(
        "Fetched {} files from {}",
        fetched.files.len(),
        fetched.repository.full_name
    );
    Ok(Json(fetched.into()))
}

async fn run_action<S: RepoSource + 'static>(
    State(state): State<Arc<ServiceState<S>>>,
    body: Bytes,
) -> Result<Json<ActionResponse>, ApiError> {
    let response = state.actions.handle_json(body_json(&body)).await?;
    tracing::info!("{} answered by {}", response.action, response.model);
    Ok(Json(response))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Serve until Ctrl-C.
pub async fn serve<S: RepoSource + 'static>(
    listener: tokio::net::TcpListener,
    fetcher: RepoFetcher<S>,
    actions: ActionHandler,
) -> std::io::Result<()> {
    axum::serve(listener, router(fetcher, actions))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutting down");
        })
        .await
}
