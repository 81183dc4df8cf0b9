//! RPC error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use squad_governance::GovernanceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("missing or invalid scheduler token")]
    Unauthorized,

    #[error("scheduler hooks are disabled")]
    HooksDisabled,

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Governance(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::HooksDisabled => StatusCode::NOT_FOUND,
            Self::Metrics(_) | Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for RpcError {
    fn from(e: std::io::Error) -> Self {
        RpcError::Server(e.to_string())
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
