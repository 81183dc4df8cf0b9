//! Leader cancellation of a proposal that nobody has voted on.

use squad_directory::NotificationEvent;
use squad_store::Conditional;
use squad_types::{Proposal, ProposalStatus, WalletAddress};
use tracing::{debug, info};

use crate::error::CancelRefusal;
use crate::{GovernanceError, VoteEngine};

/// Decide a cancellation against the stored record and its committed votes.
fn cancel_refusal(
    proposal: &Proposal,
    vote_count: usize,
    requester: &WalletAddress,
) -> Option<CancelRefusal> {
    if &proposal.leader_wallet != requester {
        Some(CancelRefusal::NotLeader)
    } else if proposal.status != ProposalStatus::Active {
        Some(CancelRefusal::NotActive)
    } else if vote_count > 0 {
        Some(CancelRefusal::VotesCast)
    } else {
        None
    }
}

impl VoteEngine {
    /// Cancel a proposal on behalf of `requester`.
    ///
    /// Allowed only for the squad leader, while the proposal is active and its
    /// ledger is empty. The vote count is read from the ledger inside the
    /// update transaction, not from the denormalized tally, so a concurrent
    /// first vote either lands before (and the cancel is refused) or is
    /// refused itself.
    pub fn cancel(
        &self,
        reference: &str,
        requester: &WalletAddress,
    ) -> Result<Proposal, GovernanceError> {
        let proposal = self.resolve(reference)?;
        let mut refusal = None;
        let outcome = self.store.update_proposal(&proposal.id, &mut |p, votes| {
            refusal = cancel_refusal(p, votes.len(), requester);
            if refusal.is_some() {
                return false;
            }
            p.status = ProposalStatus::Cancelled;
            true
        })?;

        match outcome {
            Conditional::Applied(p) => {
                info!(proposal = %p.id, leader = %requester, "proposal cancelled");
                self.notifier.emit(NotificationEvent::ProposalClosed {
                    proposal_id: p.id.clone(),
                    status: p.status,
                });
                Ok(p)
            }
            Conditional::Declined(p) => {
                let reason = refusal.unwrap_or(CancelRefusal::NotActive);
                debug!(proposal = %p.id, requester = %requester, %reason, "cancel refused");
                Err(GovernanceError::Forbidden(reason))
            }
        }
    }

    /// Cancel from a signed `squad-cancel` message; the signer is the requester.
    pub fn cancel_signed(
        &self,
        reference: &str,
        signature: &str,
        message: &str,
    ) -> Result<Proposal, GovernanceError> {
        let parsed = self
            .auth
            .authenticate_cancel(reference, signature, message, self.now())?;
        self.cancel(reference, &parsed.leader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_types::{ProposalId, SquadId, Tally, Timestamp};

    fn proposal(status: ProposalStatus) -> Proposal {
        Proposal {
            id: ProposalId::new("p1"),
            squad_id: SquadId::new("s1"),
            slug: "p1".into(),
            title: "t".into(),
            leader_wallet: WalletAddress::new("Leader"),
            status,
            broadcasted: false,
            epoch_start: Timestamp::new(0),
            epoch_end: Timestamp::new(100),
            tally: Tally::default(),
            created_at: Timestamp::new(0),
        }
    }

    #[test]
    fn test_cancel_rules() {
        let leader = WalletAddress::new("Leader");
        let other = WalletAddress::new("Other");
        let active = proposal(ProposalStatus::Active);

        assert_eq!(cancel_refusal(&active, 0, &leader), None);
        assert_eq!(
            cancel_refusal(&active, 0, &other),
            Some(CancelRefusal::NotLeader)
        );
        assert_eq!(
            cancel_refusal(&active, 1, &leader),
            Some(CancelRefusal::VotesCast)
        );
        assert_eq!(
            cancel_refusal(&proposal(ProposalStatus::Scheduled), 0, &leader),
            Some(CancelRefusal::NotActive)
        );
        assert_eq!(
            cancel_refusal(&proposal(ProposalStatus::Cancelled), 0, &leader),
            Some(CancelRefusal::NotActive)
        );
    }
}
