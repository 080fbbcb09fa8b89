use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use skiff_common::WorkloadRecord;

use crate::agent::{NodeAgent, Placement};

pub fn build_router(agent: Arc<NodeAgent>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/pods", get(list_pods).post(place_pod))
        .route("/healthz", get(healthz))
        .with_state(agent)
}

/// Serve the agent API on `listener` until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    agent: Arc<NodeAgent>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(node = %agent.node_name(), %addr, "node agent listening");
    axum::serve(listener, build_router(agent))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
}

pub async fn healthz() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub async fn status(State(agent): State<Arc<NodeAgent>>) -> impl IntoResponse {
    Json(agent.get_status().await)
}

pub async fn list_pods(State(agent): State<Arc<NodeAgent>>) -> impl IntoResponse {
    Json(agent.placed().await)
}

/// POST /pods
///
/// 201 for a new placement, 200 with the stored record when the id is
/// already running here, 400 when the record names another node.
pub async fn place_pod(
    State(agent): State<Arc<NodeAgent>>,
    Json(workload): Json<WorkloadRecord>,
) -> Response {
    match agent.place_workload(workload).await {
        Ok(Placement::Placed { record, .. }) => (StatusCode::CREATED, Json(record)).into_response(),
        Ok(Placement::AlreadyPlaced(record)) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => {
            tracing::warn!(node = %agent.node_name(), error = %err, "rejected placement");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": {"code": "wrong_node", "message": err.to_string()}})),
            )
                .into_response()
        }
    }
}
