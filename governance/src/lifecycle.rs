//! Proposal lifecycle: registration, activation and finalization.
//!
//! ```text
//! scheduled -> active -> { succeeded | failed | expired }
//!                     \-> cancelled   (see cancel.rs)
//! ```
//!
//! Every transition is a conditional update that re-reads the status inside
//! the storage transaction, so two schedulers racing on the same proposal
//! cannot both win.

use squad_directory::NotificationEvent;
use squad_store::{Conditional, StoreError};
use squad_types::{validate_identifier, Proposal, ProposalStatus, Tally, Timestamp};
use tracing::{info, warn};

use crate::tally::{compute_tally, TallyOverflow};
use crate::{GovernanceError, VoteEngine};

/// Whether a proposal accepts votes at `now`.
pub fn voting_open(proposal: &Proposal, now: Timestamp) -> bool {
    proposal.status.accepts_votes() && proposal.window_open_at(now)
}

/// Decides the terminal status of a proposal whose window has ended.
pub trait OutcomePolicy: Send + Sync {
    fn decide(&self, proposal: &Proposal) -> ProposalStatus;
}

/// Succeeds when up-weight minus down-weight exceeds `pass_threshold`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetWeightPolicy {
    pub pass_threshold: i64,
}

impl OutcomePolicy for NetWeightPolicy {
    fn decide(&self, proposal: &Proposal) -> ProposalStatus {
        if proposal.tally.net_weight() > i128::from(self.pass_threshold) {
            ProposalStatus::Succeeded
        } else {
            ProposalStatus::Failed
        }
    }
}

/// Failure reasons inside a finalize transaction.
enum Refusal {
    Transition(ProposalStatus),
    Overflow(TallyOverflow),
}

impl VoteEngine {
    /// Ingest an externally authored proposal.
    pub fn register(&self, proposal: Proposal) -> Result<Proposal, GovernanceError> {
        validate_registration(&proposal)?;
        match self.store.insert_proposal(&proposal) {
            Ok(()) => {}
            Err(StoreError::Duplicate(what)) => {
                return Err(GovernanceError::DuplicateProposal(what));
            }
            Err(e) => return Err(e.into()),
        }
        info!(
            proposal = %proposal.id,
            slug = %proposal.slug,
            squad = %proposal.squad_id,
            status = %proposal.status,
            "proposal registered"
        );
        Ok(proposal)
    }

    /// Open a scheduled proposal for voting.
    pub fn activate(&self, reference: &str) -> Result<Proposal, GovernanceError> {
        let proposal = self.resolve(reference)?;
        let outcome = self.store.update_proposal(&proposal.id, &mut |p, _| {
            if !p.status.can_transition_to(ProposalStatus::Active) {
                return false;
            }
            p.status = ProposalStatus::Active;
            true
        })?;
        match outcome {
            Conditional::Applied(p) => {
                info!(proposal = %p.id, "proposal activated");
                Ok(p)
            }
            Conditional::Declined(p) => Err(GovernanceError::InvalidTransition {
                from: p.status,
                to: ProposalStatus::Active,
            }),
        }
    }

    /// Move an active proposal to a terminal outcome.
    ///
    /// `outcome` must be `succeeded`, `failed` or `expired`; cancellation has
    /// its own gate. The tally is recomputed in the same transaction, so the
    /// terminal record carries the exact final tally.
    pub fn finalize(
        &self,
        reference: &str,
        outcome: ProposalStatus,
    ) -> Result<Proposal, GovernanceError> {
        let proposal = self.resolve(reference)?;
        if outcome == ProposalStatus::Cancelled || !outcome.is_terminal() {
            return Err(GovernanceError::InvalidTransition {
                from: proposal.status,
                to: outcome,
            });
        }
        self.close(&proposal, |_| outcome)
    }

    /// Finalize every active proposal whose window has ended, deciding each
    /// outcome with `policy` against its freshly recomputed tally.
    ///
    /// Per-proposal failures are logged and skipped; the finalized proposals
    /// are returned.
    pub fn sweep_ended(&self, policy: &dyn OutcomePolicy) -> Result<Vec<Proposal>, GovernanceError> {
        let now = self.now();
        let candidates: Vec<Proposal> = self
            .store
            .list_proposals(ProposalStatus::Active)?
            .into_iter()
            .filter(|p| !p.window_open_at(now))
            .collect();

        let mut closed = Vec::with_capacity(candidates.len());
        for proposal in candidates {
            match self.close(&proposal, |p| policy.decide(p)) {
                Ok(p) => closed.push(p),
                // Someone else closed it between the scan and the update.
                Err(GovernanceError::InvalidTransition { .. }) => {}
                Err(e) => warn!(proposal = %proposal.id, error = %e, "failed to finalize"),
            }
        }
        Ok(closed)
    }

    fn close(
        &self,
        proposal: &Proposal,
        decide: impl Fn(&Proposal) -> ProposalStatus,
    ) -> Result<Proposal, GovernanceError> {
        let mut refusal = None;
        let result = self.store.update_proposal(&proposal.id, &mut |p, votes| {
            match compute_tally(votes) {
                Ok(tally) => p.tally = tally,
                Err(e) => {
                    refusal = Some(Refusal::Overflow(e));
                    return false;
                }
            }
            let next = decide(p);
            if !p.status.can_transition_to(next) || !next.is_terminal() {
                refusal = Some(Refusal::Transition(next));
                return false;
            }
            p.status = next;
            true
        })?;

        match (result, refusal) {
            (Conditional::Applied(p), _) => {
                info!(
                    proposal = %p.id,
                    status = %p.status,
                    up_weight = p.tally.up_weight,
                    down_weight = p.tally.down_weight,
                    "proposal finalized"
                );
                self.notifier.emit(NotificationEvent::ProposalClosed {
                    proposal_id: p.id.clone(),
                    status: p.status,
                });
                Ok(p)
            }
            (Conditional::Declined(p), Some(Refusal::Transition(to))) => {
                Err(GovernanceError::InvalidTransition { from: p.status, to })
            }
            (Conditional::Declined(p), Some(Refusal::Overflow(e))) => Err(
                GovernanceError::Dependency(format!("{e} on proposal {}", p.id)),
            ),
            (Conditional::Declined(p), None) => Err(GovernanceError::Dependency(format!(
                "finalize of proposal {} declined",
                p.id
            ))),
        }
    }
}

fn validate_registration(proposal: &Proposal) -> Result<(), GovernanceError> {
    let invalid = |reason: String| Err(GovernanceError::InvalidProposal(reason));

    validate_identifier(proposal.id.as_str()).map_err(|e| {
        GovernanceError::InvalidProposal(format!("id: {e}"))
    })?;
    validate_identifier(proposal.slug.as_str()).map_err(|e| {
        GovernanceError::InvalidProposal(format!("slug: {e}"))
    })?;
    validate_identifier(proposal.squad_id.as_str()).map_err(|e| {
        GovernanceError::InvalidProposal(format!("squad id: {e}"))
    })?;
    if !matches!(
        proposal.status,
        ProposalStatus::Scheduled | ProposalStatus::Active
    ) {
        return invalid(format!("cannot register a {} proposal", proposal.status));
    }
    if proposal.epoch_start >= proposal.epoch_end {
        return invalid("epoch_start must be before epoch_end".into());
    }
    if proposal.tally != Tally::default() {
        return invalid("a new proposal must have an empty tally".into());
    }
    if proposal.broadcasted {
        return invalid("a new proposal cannot already be broadcast".into());
    }
    if proposal.title.trim().is_empty() {
        return invalid("title is empty".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_types::{ProposalId, SquadId, WalletAddress};

    fn proposal() -> Proposal {
        Proposal {
            id: ProposalId::new("p1"),
            squad_id: SquadId::new("s1"),
            slug: "fund-meetup".into(),
            title: "Fund the meetup".into(),
            leader_wallet: WalletAddress::new("Leader"),
            status: ProposalStatus::Scheduled,
            broadcasted: false,
            epoch_start: Timestamp::new(100),
            epoch_end: Timestamp::new(200),
            tally: Tally::default(),
            created_at: Timestamp::new(50),
        }
    }

    #[test]
    fn test_voting_window_is_half_open() {
        let mut p = proposal();
        p.status = ProposalStatus::Active;
        assert!(voting_open(&p, Timestamp::new(199)));
        assert!(!voting_open(&p, Timestamp::new(200)));
        p.status = ProposalStatus::Scheduled;
        assert!(!voting_open(&p, Timestamp::new(150)));
    }

    #[test]
    fn test_net_weight_policy() {
        let policy = NetWeightPolicy { pass_threshold: 0 };
        let mut p = proposal();
        p.tally = Tally {
            up_weight: 600,
            down_weight: 600,
            abstain_weight: 0,
            total_weight: 1200,
            voter_count: 2,
        };
        assert_eq!(policy.decide(&p), ProposalStatus::Failed);
        p.tally.up_weight = 601;
        assert_eq!(policy.decide(&p), ProposalStatus::Succeeded);
        let strict = NetWeightPolicy { pass_threshold: 100 };
        assert_eq!(strict.decide(&p), ProposalStatus::Failed);
    }

    #[test]
    fn test_registration_validation() {
        assert!(validate_registration(&proposal()).is_ok());

        let mut p = proposal();
        p.status = ProposalStatus::Succeeded;
        assert!(validate_registration(&p).is_err());

        let mut p = proposal();
        p.epoch_end = p.epoch_start;
        assert!(validate_registration(&p).is_err());

        let mut p = proposal();
        p.broadcasted = true;
        assert!(validate_registration(&p).is_err());

        let mut p = proposal();
        p.slug = "has space".into();
        assert!(validate_registration(&p).is_err());

        let mut p = proposal();
        p.tally.up_weight = 1;
        assert!(validate_registration(&p).is_err());
    }
}
