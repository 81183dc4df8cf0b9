//! Axum-based HTTP server.

use std::future::Future;
use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use prometheus::Registry;
use squad_governance::VoteEngine;
use tokio::net::TcpListener;
use tracing::info;

use crate::auth::require_scheduler;
use crate::error::RpcError;
use crate::handlers;
use crate::metrics::RpcMetrics;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct RpcState {
    pub engine: Arc<VoteEngine>,
    pub metrics: Arc<RpcMetrics>,
    /// Encoded by `GET /metrics`.
    pub registry: Registry,
    /// Bearer token for the scheduler hooks; `None` disables them.
    pub scheduler_token: Option<Arc<str>>,
}

impl RpcState {
    /// Build state whose counters are registered into `registry`.
    pub fn new(engine: Arc<VoteEngine>, registry: Registry) -> Result<Self, RpcError> {
        let metrics = RpcMetrics::register(&registry)?;
        Ok(Self {
            engine,
            metrics: Arc::new(metrics),
            registry,
            scheduler_token: None,
        })
    }

    pub fn with_scheduler_token(mut self, token: Option<String>) -> Self {
        self.scheduler_token = token.map(Arc::from);
        self
    }
}

pub fn router(state: RpcState) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/proposals/:reference", get(handlers::get_proposal))
        .route("/proposals/:reference/votes", post(handlers::cast_vote))
        .route(
            "/proposals/:reference/votes/:wallet",
            get(handlers::get_vote),
        )
        .route("/proposals/:reference/cancel", post(handlers::cancel_proposal));

    let hooks = Router::new()
        .route("/proposals", post(handlers::register_proposal))
        .route(
            "/proposals/:reference/activate",
            post(handlers::activate_proposal),
        )
        .route(
            "/proposals/:reference/finalize",
            post(handlers::finalize_proposal),
        )
        .route(
            "/proposals/:reference/recompute",
            post(handlers::recompute_tally),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_scheduler,
        ));

    public.merge(hooks).with_state(state)
}

/// Serve the API on an already bound listener until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: RpcState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), RpcError> {
    info!(addr = %listener.local_addr()?, "RPC server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("RPC server stopped");
    Ok(())
}
