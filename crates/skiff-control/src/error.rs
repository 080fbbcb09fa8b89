use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use skiff_common::{InvalidSpec, NodeClientError};
use skiff_scheduler::ScheduleError;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error(transparent)]
    InvalidSpec(#[from] InvalidSpec),

    #[error("no available nodes to schedule workload")]
    NoCapacity,

    #[error("placement on node '{node}' failed: {source}")]
    Placement {
        node: String,
        #[source]
        source: NodeClientError,
    },
}

impl From<ScheduleError> for ControlError {
    fn from(err: ScheduleError) -> Self {
        match err {
            ScheduleError::NoCandidates => ControlError::NoCapacity,
        }
    }
}

impl ControlError {
    pub fn status(&self) -> StatusCode {
        match self {
            ControlError::MalformedBody(_) | ControlError::InvalidSpec(_) => {
                StatusCode::BAD_REQUEST
            }
            ControlError::NoCapacity => StatusCode::INTERNAL_SERVER_ERROR,
            ControlError::Placement { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ControlError::MalformedBody(_) => "malformed_body",
            ControlError::InvalidSpec(_) => "invalid_spec",
            ControlError::NoCapacity => "no_capacity",
            ControlError::Placement { .. } => "placement_failed",
        }
    }
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
    request_id: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

pub fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    let body = ErrorResponse {
        error: ErrorDetail {
            code: code.to_string(),
            message: message.to_string(),
            request_id: format!("req_{}", Uuid::new_v4()),
        },
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        error_response(self.status(), self.code(), &self.to_string())
    }
}
