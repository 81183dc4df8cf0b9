//! HTTP API for squad proposal voting.
//!
//! Provides endpoints for:
//! - Casting signed votes and reading them back
//! - Reading proposals with their tally
//! - Leader cancellation
//! - Scheduler hooks (register, activate, finalize, recompute), guarded by
//!   a bearer token
//! - Health and Prometheus metrics

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::RpcError;
pub use metrics::RpcMetrics;
pub use server::{router, serve, RpcState};
