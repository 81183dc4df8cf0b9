//! The vote engine: casting votes and reading proposal state.
//!
//! A cast runs these steps in order:
//! 1. parse the choice
//! 2. authenticate the signed message
//! 3. check reputation
//! 4. resolve the proposal and check the voting window
//! 5. check squad membership
//! 6. insert the vote
//! 7. recompute the tally
//!
//! The insert re-checks the window inside the storage transaction, and the
//! `(proposal, voter)` uniqueness is enforced by the store. Steps 1-5 can
//! therefore race with anything without breaking an invariant.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info};

use squad_crypto::{vote_id, SignatureVerifier};
use squad_directory::{NotificationEvent, NotificationSink, SquadDirectory, VoterDirectory};
use squad_store::{GovernanceStore, StoreError, VoteInsert};
use squad_types::{
    Clock, Proposal, ProposalId, Tally, Timestamp, Vote, VoteChoice, WalletAddress,
};

use crate::auth::Authenticator;
use crate::eligibility::{check_membership, check_reputation};
use crate::lifecycle::voting_open;
use crate::tally::{recount, Recount, TallyOverflow};
use crate::{GovernanceError, GovernanceParams};

/// A vote request as received from a wallet.
#[derive(Clone, Debug)]
pub struct CastVote {
    /// Proposal id or slug.
    pub reference: String,
    pub choice: String,
    /// Base58 Ed25519 signature over `message`.
    pub signature: String,
    pub message: String,
}

/// Result of a successful cast.
#[derive(Clone, Debug, Serialize)]
pub struct CastReceipt {
    pub vote: Vote,
    /// Tally after the recompute; `None` if the recompute failed and is
    /// deferred to the next one.
    pub tally: Option<Tally>,
    /// This vote pushed the proposal over the broadcast threshold.
    pub broadcast: bool,
}

/// Orchestrates authentication, eligibility, the vote ledger and the tally.
///
/// Holds no proposal state of its own: every decision reads the store.
pub struct VoteEngine {
    pub(crate) store: Arc<dyn GovernanceStore>,
    pub(crate) voters: Arc<dyn VoterDirectory>,
    pub(crate) squads: Arc<dyn SquadDirectory>,
    pub(crate) notifier: Arc<dyn NotificationSink>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) auth: Authenticator,
    pub(crate) params: GovernanceParams,
}

impl VoteEngine {
    pub fn new(
        store: Arc<dyn GovernanceStore>,
        voters: Arc<dyn VoterDirectory>,
        squads: Arc<dyn SquadDirectory>,
        notifier: Arc<dyn NotificationSink>,
        verifier: Arc<dyn SignatureVerifier>,
        clock: Arc<dyn Clock>,
        params: GovernanceParams,
    ) -> Self {
        let auth = Authenticator::new(verifier, params.message_max_age_secs);
        Self {
            store,
            voters,
            squads,
            notifier,
            clock,
            auth,
            params,
        }
    }

    pub fn params(&self) -> &GovernanceParams {
        &self.params
    }

    /// Current time on the engine's clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Resolve a proposal reference: by id first, then by slug.
    pub fn resolve(&self, reference: &str) -> Result<Proposal, GovernanceError> {
        let id = ProposalId::parse(reference)
            .map_err(|e| GovernanceError::InvalidReference(e.to_string()))?;
        match self.store.get_proposal(&id) {
            Ok(p) => return Ok(p),
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        self.store
            .find_proposal_by_slug(reference)?
            .ok_or_else(|| GovernanceError::ProposalNotFound(reference.to_string()))
    }

    /// Get a proposal with its denormalized tally.
    pub fn get_proposal(&self, reference: &str) -> Result<Proposal, GovernanceError> {
        self.resolve(reference)
    }

    /// A voter's vote on a proposal, if they cast one.
    pub fn get_vote(
        &self,
        reference: &str,
        voter: &WalletAddress,
    ) -> Result<Option<Vote>, GovernanceError> {
        let proposal = self.resolve(reference)?;
        Ok(self.store.get_vote(&proposal.id, voter)?)
    }

    /// Cast a signed vote.
    pub async fn cast_vote(&self, request: CastVote) -> Result<CastReceipt, GovernanceError> {
        let vote = self.prepare_vote(request).await?;
        self.commit_vote(vote)
    }

    /// Steps 1-5 of a cast: everything that talks to the directories.
    /// Returns the vote to commit; nothing is written.
    pub async fn prepare_vote(&self, request: CastVote) -> Result<Vote, GovernanceError> {
        let choice: VoteChoice = request.choice.parse()?;
        let now = self.now();
        let message = self.auth.authenticate_vote(
            &request.reference,
            choice,
            &request.signature,
            &request.message,
            now,
        )?;
        let wallet = message.voter;

        let voter = self.voters.get_or_create_voter(&wallet).await?;
        check_reputation(&voter, self.params.min_points_to_vote)?;

        let proposal = self.resolve(&request.reference)?;
        if !voting_open(&proposal, now) {
            debug!(proposal = %proposal.id, status = %proposal.status, "vote on closed proposal");
            return Err(GovernanceError::VotingClosed(proposal.id.to_string()));
        }
        check_membership(self.squads.as_ref(), &proposal, &wallet).await?;

        Ok(Vote {
            id: vote_id(&proposal.id, &wallet),
            proposal_id: proposal.id,
            voter_wallet: wallet,
            voter_user_id: voter.user_id,
            squad_id: proposal.squad_id,
            choice,
            weight: voter.points,
            cast_at: now,
        })
    }

    /// Steps 6-7 of a cast: insert a prepared vote and recompute the tally.
    /// Blocks on storage writes.
    pub fn commit_vote(&self, vote: Vote) -> Result<CastReceipt, GovernanceError> {
        // The clock is read again so a slow directory round-trip cannot
        // carry a vote past the end of the window.
        let clock = Arc::clone(&self.clock);
        let admit = move |p: &Proposal| voting_open(p, clock.now());
        match self.store.insert_vote(&vote, &admit) {
            Ok(VoteInsert::Inserted) => {}
            Ok(VoteInsert::Refused(p)) => {
                return Err(GovernanceError::VotingClosed(p.id.to_string()));
            }
            Err(StoreError::Duplicate(_)) => {
                return Err(GovernanceError::DuplicateVote {
                    proposal: vote.proposal_id.to_string(),
                    voter: vote.voter_wallet.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
        info!(
            proposal = %vote.proposal_id,
            voter = %vote.voter_wallet,
            choice = %vote.choice,
            weight = vote.weight,
            "vote cast"
        );

        let (tally, broadcast) = match self.refresh_tally(&vote.proposal_id) {
            Ok((p, broadcast)) => (Some(p.tally), broadcast),
            Err(e) => {
                error!(proposal = %vote.proposal_id, error = %e, "tally recompute failed after vote");
                (None, false)
            }
        };
        Ok(CastReceipt {
            vote,
            tally,
            broadcast,
        })
    }

    /// Recompute a proposal's tally from its votes and store it.
    pub fn recompute(&self, reference: &str) -> Result<Proposal, GovernanceError> {
        let proposal = self.resolve(reference)?;
        self.refresh_tally(&proposal.id).map(|(p, _)| p)
    }

    /// Recount inside a conditional update and emit the broadcast event if
    /// this call flipped the flag. Returns the stored proposal.
    pub(crate) fn refresh_tally(&self, id: &ProposalId) -> Result<(Proposal, bool), GovernanceError> {
        let threshold = self.params.broadcast_threshold;
        let mut outcome: Result<Recount, TallyOverflow> = Ok(Recount::default());
        let result = self.store.update_proposal(id, &mut |p, votes| {
            outcome = recount(p, votes, threshold);
            matches!(outcome, Ok(Recount { changed: true, .. }))
        })?;
        let recount = outcome
            .map_err(|e| GovernanceError::Dependency(format!("{e} on proposal {id}")))?;

        let broadcast = result.is_applied() && recount.broadcast;
        let proposal = result.into_proposal();
        if broadcast {
            info!(
                proposal = %proposal.id,
                up_weight = proposal.tally.up_weight,
                threshold,
                "broadcast threshold reached"
            );
            self.notifier.emit(NotificationEvent::BroadcastReached {
                proposal_id: proposal.id.clone(),
            });
        }
        Ok((proposal, broadcast))
    }
}
