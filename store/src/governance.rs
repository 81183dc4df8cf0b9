//! Governance storage trait: proposals and the vote ledger.
//!
//! Proposals and votes share one trait because the two invariants that span
//! them must be decided inside a single storage transaction:
//!
//! - a vote is only admitted while its proposal is open, and
//! - a proposal is only cancelled while its ledger is empty.
//!
//! Neither is a read-then-write in application code.

use crate::StoreError;
use squad_types::{Proposal, ProposalId, ProposalStatus, Vote, WalletAddress};

/// Result of a conditional proposal update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Conditional {
    /// The update ran and was committed; carries the stored record.
    Applied(Proposal),
    /// The guard declined; nothing was written. Carries the record as read.
    Declined(Proposal),
}

impl Conditional {
    pub fn proposal(&self) -> &Proposal {
        match self {
            Self::Applied(p) | Self::Declined(p) => p,
        }
    }

    pub fn into_proposal(self) -> Proposal {
        match self {
            Self::Applied(p) | Self::Declined(p) => p,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Result of a vote insertion that did not hit the uniqueness constraint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoteInsert {
    /// The vote is durably stored.
    Inserted,
    /// The admission predicate rejected the proposal; nothing was written.
    Refused(Proposal),
}

/// Storage for proposals and their votes.
pub trait GovernanceStore: Send + Sync {
    /// Store a new proposal.
    ///
    /// Fails with [`StoreError::Duplicate`] if the id or the slug is taken.
    /// Ids and slugs form one namespace: a new id may not equal another
    /// proposal's slug, nor a new slug another proposal's id.
    fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError>;

    /// Get a proposal by id. Fails with [`StoreError::NotFound`].
    fn get_proposal(&self, id: &ProposalId) -> Result<Proposal, StoreError>;

    /// Look up a proposal by its slug.
    fn find_proposal_by_slug(&self, slug: &str) -> Result<Option<Proposal>, StoreError>;

    /// List proposals currently in `status`.
    fn list_proposals(&self, status: ProposalStatus) -> Result<Vec<Proposal>, StoreError>;

    /// Atomically read-modify-write a proposal.
    ///
    /// `update` receives a copy of the proposal and every vote committed for it,
    /// read inside the same transaction. Returning `true` commits the modified
    /// copy; `false` discards it. Implementations call `update` exactly once.
    fn update_proposal(
        &self,
        id: &ProposalId,
        update: &mut dyn FnMut(&mut Proposal, &[Vote]) -> bool,
    ) -> Result<Conditional, StoreError>;

    /// Insert a vote if `admit` accepts its proposal.
    ///
    /// Uniqueness of `(proposal_id, voter_wallet)` is enforced by the backend
    /// itself: a second insert for the same pair fails with
    /// [`StoreError::Duplicate`] no matter how the calls interleave. Fails with
    /// [`StoreError::NotFound`] if the proposal does not exist.
    fn insert_vote(
        &self,
        vote: &Vote,
        admit: &dyn Fn(&Proposal) -> bool,
    ) -> Result<VoteInsert, StoreError>;

    /// Get a specific voter's vote on a proposal.
    fn get_vote(
        &self,
        proposal: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<Option<Vote>, StoreError>;

    /// Get all votes for a proposal.
    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, StoreError>;

    /// Number of votes committed for a proposal.
    fn vote_count(&self, proposal: &ProposalId) -> Result<u64, StoreError> {
        self.get_votes(proposal).map(|v| v.len() as u64)
    }
}
