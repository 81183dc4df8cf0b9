//! Bearer-token guard for the scheduler hooks.
//!
//! Register, activate, finalize and recompute move proposals through their
//! lifecycle, so only the external scheduler may call them. Without a
//! configured token the hooks are disabled and answer 404.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::error::RpcError;
use crate::server::RpcState;

/// Reject the request unless it carries `Authorization: Bearer <token>`.
pub async fn require_scheduler(
    State(state): State<RpcState>,
    request: Request,
    next: Next,
) -> Result<Response, RpcError> {
    let expected = state
        .scheduler_token
        .as_deref()
        .ok_or(RpcError::HooksDisabled)?;
    let presented = bearer_token(request.headers())
        .map(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())));
    match presented {
        Some(true) => Ok(next.run(request).await),
        Some(false) => {
            warn!(path = %request.uri().path(), "scheduler hook called with a wrong token");
            Err(RpcError::Unauthorized)
        }
        None => Err(RpcError::Unauthorized),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}
