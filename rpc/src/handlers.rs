//! Request handlers and their wire types.
//!
//! Reads run inline: LMDB readers never wait on the writer. Anything that
//! opens a write transaction goes through [`blocking`].

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use squad_governance::{CastReceipt, CastVote, GovernanceError, VoteEngine};
use squad_types::{
    Proposal, ProposalId, ProposalStatus, SquadId, Tally, Timestamp, Vote, WalletAddress,
};

use crate::error::RpcError;
use crate::server::RpcState;

/// Unwrap a JSON body, turning axum's rejection into our `{error}` shape.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, RpcError> {
    payload
        .map(|Json(v)| v)
        .map_err(|e| RpcError::InvalidRequest(e.body_text()))
}

/// Run an engine call that writes to storage on the blocking pool. LMDB
/// write transactions hold the writer lock and may fsync on commit.
async fn blocking<T, F>(engine: &Arc<VoteEngine>, call: F) -> Result<T, RpcError>
where
    T: Send + 'static,
    F: FnOnce(&VoteEngine) -> Result<T, GovernanceError> + Send + 'static,
{
    let engine = Arc::clone(engine);
    tokio::task::spawn_blocking(move || call(&engine))
        .await
        .map_err(|e| RpcError::Server(format!("storage task failed: {e}")))?
        .map_err(RpcError::from)
}

// ── Votes ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CastVoteRequest {
    pub choice: String,
    pub signature: String,
    pub message: String,
}

pub async fn cast_vote(
    State(state): State<RpcState>,
    Path(reference): Path<String>,
    payload: Result<Json<CastVoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CastReceipt>), RpcError> {
    let req = body(payload)?;
    let request = CastVote {
        reference,
        choice: req.choice,
        signature: req.signature,
        message: req.message,
    };
    let outcome = match state.engine.prepare_vote(request).await {
        Ok(vote) => blocking(&state.engine, move |engine| engine.commit_vote(vote)).await,
        Err(e) => Err(e.into()),
    };
    match outcome {
        Ok(receipt) => {
            state.metrics.votes_cast.inc();
            if receipt.broadcast {
                state.metrics.broadcasts.inc();
            }
            Ok((StatusCode::CREATED, Json(receipt)))
        }
        Err(e) => {
            let kind = match &e {
                RpcError::Governance(g) => g.kind().as_str(),
                _ => "internal",
            };
            state.metrics.votes_rejected.with_label_values(&[kind]).inc();
            debug!(error = %e, "vote rejected");
            Err(e)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub vote: Option<Vote>,
}

pub async fn get_vote(
    State(state): State<RpcState>,
    Path((reference, wallet)): Path<(String, String)>,
) -> Result<Json<VoteResponse>, RpcError> {
    let wallet =
        WalletAddress::parse(&wallet).map_err(|e| RpcError::InvalidRequest(e.to_string()))?;
    let vote = state.engine.get_vote(&reference, &wallet)?;
    Ok(Json(VoteResponse { vote }))
}

// ── Proposals ────────────────────────────────────────────────────────────

pub async fn get_proposal(
    State(state): State<RpcState>,
    Path(reference): Path<String>,
) -> Result<Json<Proposal>, RpcError> {
    Ok(Json(state.engine.get_proposal(&reference)?))
}

/// An authored proposal handed over for voting.
#[derive(Debug, Deserialize)]
pub struct RegisterProposalRequest {
    pub id: String,
    pub squad_id: String,
    pub slug: String,
    pub title: String,
    pub leader_wallet: String,
    #[serde(default = "default_status")]
    pub status: ProposalStatus,
    pub epoch_start: u64,
    pub epoch_end: u64,
}

fn default_status() -> ProposalStatus {
    ProposalStatus::Scheduled
}

pub async fn register_proposal(
    State(state): State<RpcState>,
    payload: Result<Json<RegisterProposalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Proposal>), RpcError> {
    let req = body(payload)?;
    let leader_wallet = WalletAddress::parse(&req.leader_wallet)
        .map_err(|e| RpcError::InvalidRequest(format!("leader_wallet: {e}")))?;
    let proposal = Proposal {
        id: ProposalId::new(req.id),
        squad_id: SquadId::new(req.squad_id),
        slug: req.slug,
        title: req.title,
        leader_wallet,
        status: req.status,
        broadcasted: false,
        epoch_start: Timestamp::new(req.epoch_start),
        epoch_end: Timestamp::new(req.epoch_end),
        tally: Tally::default(),
        created_at: state.engine.now(),
    };
    let stored = blocking(&state.engine, move |engine| engine.register(proposal)).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub signature: String,
    pub message: String,
}

pub async fn cancel_proposal(
    State(state): State<RpcState>,
    Path(reference): Path<String>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> Result<Json<Proposal>, RpcError> {
    let req = body(payload)?;
    let proposal = blocking(&state.engine, move |engine| {
        engine.cancel_signed(&reference, &req.signature, &req.message)
    })
    .await?;
    state.metrics.proposals_cancelled.inc();
    Ok(Json(proposal))
}

pub async fn activate_proposal(
    State(state): State<RpcState>,
    Path(reference): Path<String>,
) -> Result<Json<Proposal>, RpcError> {
    let proposal = blocking(&state.engine, move |engine| engine.activate(&reference)).await?;
    Ok(Json(proposal))
}

#[derive(Debug, Deserialize)]
pub struct FinalizeRequest {
    pub outcome: ProposalStatus,
}

pub async fn finalize_proposal(
    State(state): State<RpcState>,
    Path(reference): Path<String>,
    payload: Result<Json<FinalizeRequest>, JsonRejection>,
) -> Result<Json<Proposal>, RpcError> {
    let req = body(payload)?;
    let proposal = blocking(&state.engine, move |engine| {
        engine.finalize(&reference, req.outcome)
    })
    .await?;
    Ok(Json(proposal))
}

pub async fn recompute_tally(
    State(state): State<RpcState>,
    Path(reference): Path<String>,
) -> Result<Json<Proposal>, RpcError> {
    let proposal = blocking(&state.engine, move |engine| engine.recompute(&reference)).await?;
    Ok(Json(proposal))
}

// ── Service ──────────────────────────────────────────────────────────────

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<RpcState>) -> Result<impl IntoResponse, RpcError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&state.registry.gather(), &mut buffer)?;
    let text = String::from_utf8(buffer).map_err(|e| RpcError::Server(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, encoder.format_type().to_string())], text))
}

