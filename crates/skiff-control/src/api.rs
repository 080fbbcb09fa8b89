//! HTTP surface of the control plane.
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/pods` | Create and place a workload |
//! | GET | `/pods` | List registered workloads |
//! | GET | `/nodes` | List cached node snapshots |
//! | GET | `/healthz` | Liveness probe |
//! | GET | `/metrics` | Prometheus exposition |

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use skiff_common::WorkloadSpec;

use crate::control_plane::ControlPlane;
use crate::error::ControlError;
use crate::metrics::{metrics_handler, track_requests, Metrics};

#[derive(Clone)]
pub struct AppState {
    pub control: Arc<ControlPlane>,
    pub metrics: Arc<Metrics>,
}

pub fn build_router(control: Arc<ControlPlane>) -> Router {
    let st = AppState {
        metrics: control.metrics(),
        control,
    };

    Router::new()
        .route("/pods", get(list_pods).post(create_pod))
        .route("/nodes", get(list_nodes))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(st.clone(), track_requests))
        .with_state(st)
}

pub async fn healthz() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// POST /pods
pub async fn create_pod(
    State(st): State<AppState>,
    payload: Result<Json<WorkloadSpec>, JsonRejection>,
) -> Result<impl IntoResponse, ControlError> {
    let Json(spec) = payload.map_err(|e| ControlError::MalformedBody(e.body_text()))?;
    let record = st.control.create_workload(&spec).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /pods
pub async fn list_pods(State(st): State<AppState>) -> impl IntoResponse {
    Json(st.control.list_workloads().await)
}

/// GET /nodes
pub async fn list_nodes(State(st): State<AppState>) -> impl IntoResponse {
    Json(st.control.list_node_snapshots().await)
}
