use std::{collections::BTreeMap, net::SocketAddr, sync::Arc};

use argus_common::{
    error::Error,
    pipeline::{PipelineRun, PipelineStatus},
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{cors::Any, trace::TraceLayer};
use tracing::info;

use crate::repository::StatusRepository;

/// HTTP surface over the [`StatusRepository`]. The route handlers are
/// thin projections; all aggregation logic lives in the repository.
pub struct StatusServer {
    repository: Arc<StatusRepository>,
    listen_addr: SocketAddr,
}

impl StatusServer {
    pub fn new(repository: Arc<StatusRepository>, listen_addr: String) -> Result<Self, Error> {
        let listen_addr: SocketAddr = listen_addr.parse().map_err(|e| {
            Error::Internal(format!(
                "Failed to parse listen address for status server: {}",
                e
            ))
        })?;

        Ok(Self {
            repository,
            listen_addr,
        })
    }

    pub fn router(&self) -> Router {
        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods(Any)
            .allow_origin(Any);

        Router::new()
            .route("/status", get(latest_status))
            .route("/status/history", get(full_history))
            .route("/status/list", get(list_schedules))
            .route("/healthz", get(healthz))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.repository))
    }

    /// Serves until ctrl-c. Abandoned requests drop their in-flight
    /// upstream calls with them; there is no partial state to clean up.
    pub async fn serve(&self) -> Result<(), Error> {
        let listener = TcpListener::bind(self.listen_addr)
            .await
            .map_err(|e| Error::Internal(format!("Failed to bind status listener: {}", e)))?;

        info!("Status gateway listening on http://{}", self.listen_addr);

        axum::serve(listener, self.router().into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| Error::Internal(format!("Status server encountered an error: {}", e)))
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received, stopping status server");
    }
}

async fn latest_status(
    State(repository): State<Arc<StatusRepository>>,
) -> Result<Json<BTreeMap<String, PipelineStatus>>, ApiError> {
    Ok(Json(repository.latest_status().await?))
}

async fn full_history(
    State(repository): State<Arc<StatusRepository>>,
) -> Result<Json<BTreeMap<String, Vec<PipelineRun>>>, ApiError> {
    Ok(Json(repository.full_history().await?))
}

async fn list_schedules(
    State(repository): State<Arc<StatusRepository>>,
) -> Result<Json<BTreeMap<String, Option<String>>>, ApiError> {
    Ok(Json(repository.list_schedules().await?))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Maps domain errors onto HTTP responses. Upstream trouble is the
/// gateway's dependency failing, so it surfaces as 502 rather than a
/// client error or an empty success payload.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::UpstreamUnavailable
            | Error::UpstreamRequestFailed { .. }
            | Error::UpstreamInvalidResponse { .. } => StatusCode::BAD_GATEWAY,
            Error::UnknownPipeline(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "detail": self.0.to_string() }))).into_response()
    }
}
