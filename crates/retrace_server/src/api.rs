//! API server
//!
//! Routes:
//! - `GET /` redirects to `/static/index.html`
//! - `GET /static/*` serves the front-end files
//! - `POST /run` with `{"step": <int>}` moves the cursor
//! - `POST /reset` rewinds to cycle 0

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use retrace_core::TraceError;
use retrace_replay::{ReplayCursor, Snapshot};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    pub bind: String,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

/// Body of `POST /run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Step code: 0 hold, 1 forward, -1 backward, other jump to end
    pub step: i64,
}

/// Shared handler state. One cursor per process; the mutex serializes
/// clients.
#[derive(Clone)]
pub struct AppState {
    cursor: Arc<Mutex<ReplayCursor>>,
}

impl AppState {
    /// Wrap a cursor
    #[must_use]
    pub fn new(cursor: ReplayCursor) -> Self {
        Self {
            cursor: Arc::new(Mutex::new(cursor)),
        }
    }

    /// Current cycle of the shared cursor
    pub async fn position(&self) -> u64 {
        self.cursor.lock().await.position()
    }
}

/// Trace failure surfaced to HTTP clients
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] TraceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_format() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        tracing::error!(%status, error = %self.0, "replay query failed");
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Build the router
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/run", post(run))
        .route("/reset", post(reset))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> Redirect {
    Redirect::to("/static/index.html")
}

async fn run(
    State(state): State<AppState>,
    Json(request): Json<RunRequest>,
) -> Result<Json<Snapshot>, ApiError> {
    let mut cursor = state.cursor.lock().await;
    let snapshot = cursor.query_code(request.step)?;
    Ok(Json(snapshot))
}

async fn reset(State(state): State<AppState>) -> Result<Json<Snapshot>, ApiError> {
    let mut cursor = state.cursor.lock().await;
    let snapshot = cursor.reset()?;
    Ok(Json(snapshot))
}

/// HTTP server around one replay cursor
pub struct ApiServer {
    config: ServerConfig,
    state: AppState,
}

impl ApiServer {
    /// Create a server for `cursor`
    #[must_use]
    pub fn new(config: ServerConfig, cursor: ReplayCursor) -> Self {
        Self {
            config,
            state: AppState::new(cursor),
        }
    }

    /// Bind and serve until the process is stopped
    ///
    /// # Errors
    ///
    /// Returns error if binding or serving fails
    pub async fn serve(self) -> std::io::Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.config.bind).await?;
        tracing::info!(
            addr = %listener.local_addr()?,
            static_dir = %self.config.static_dir.display(),
            "serving replay"
        );
        axum::serve(listener, router(self.state, &self.config)).await
    }
}
