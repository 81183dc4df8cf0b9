//! Nullable store: thread-safe in-memory storage for testing.

use squad_store::{Conditional, GovernanceStore, StoreError, VoteInsert};
use squad_types::{Proposal, ProposalId, ProposalStatus, Vote, WalletAddress};
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

#[derive(Default)]
struct State {
    proposals: HashMap<ProposalId, Proposal>,
    slugs: HashMap<String, ProposalId>,
    votes: HashMap<ProposalId, BTreeMap<WalletAddress, Vote>>,
}

/// An in-memory governance store for testing.
///
/// All state sits behind one lock, so every trait method is a single
/// atomic step, like a write transaction in the LMDB backend.
#[derive(Default)]
pub struct NullStore {
    state: Mutex<State>,
    fail_updates: AtomicBool,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `update_proposal` fail with a backend error.
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }
}

impl GovernanceStore for NullStore {
    fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.proposals.contains_key(&proposal.id) {
            return Err(StoreError::Duplicate(format!("proposal {}", proposal.id)));
        }
        if state.slugs.contains_key(&proposal.slug) {
            return Err(StoreError::Duplicate(format!("slug {}", proposal.slug)));
        }
        if proposal.slug != proposal.id.as_str()
            && state.proposals.contains_key(&ProposalId::new(proposal.slug.as_str()))
        {
            return Err(StoreError::Duplicate(format!(
                "slug {} is the id of another proposal",
                proposal.slug
            )));
        }
        if state.slugs.contains_key(proposal.id.as_str()) {
            return Err(StoreError::Duplicate(format!(
                "proposal id {} is the slug of another proposal",
                proposal.id
            )));
        }
        state
            .slugs
            .insert(proposal.slug.clone(), proposal.id.clone());
        state
            .proposals
            .insert(proposal.id.clone(), proposal.clone());
        Ok(())
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Proposal, StoreError> {
        self.state
            .lock()
            .unwrap()
            .proposals
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))
    }

    fn find_proposal_by_slug(&self, slug: &str) -> Result<Option<Proposal>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .slugs
            .get(slug)
            .and_then(|id| state.proposals.get(id))
            .cloned())
    }

    fn list_proposals(&self, status: ProposalStatus) -> Result<Vec<Proposal>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut found: Vec<Proposal> = state
            .proposals
            .values()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    fn update_proposal(
        &self,
        id: &ProposalId,
        update: &mut dyn FnMut(&mut Proposal, &[Vote]) -> bool,
    ) -> Result<Conditional, StoreError> {
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("null store: updates disabled".into()));
        }
        let mut state = self.state.lock().unwrap();
        let current = state
            .proposals
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;
        let votes: Vec<Vote> = state
            .votes
            .get(id)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default();

        let mut next = current.clone();
        if !update(&mut next, &votes) {
            return Ok(Conditional::Declined(current));
        }
        if next.id != current.id || next.slug != current.slug {
            return Err(StoreError::Backend(format!(
                "update of proposal {id} may not change its keys"
            )));
        }
        state.proposals.insert(id.clone(), next.clone());
        Ok(Conditional::Applied(next))
    }

    fn insert_vote(
        &self,
        vote: &Vote,
        admit: &dyn Fn(&Proposal) -> bool,
    ) -> Result<VoteInsert, StoreError> {
        let mut state = self.state.lock().unwrap();
        let proposal = state
            .proposals
            .get(&vote.proposal_id)
            .ok_or_else(|| StoreError::NotFound(format!("proposal {}", vote.proposal_id)))?;
        if !admit(proposal) {
            return Ok(VoteInsert::Refused(proposal.clone()));
        }
        match state
            .votes
            .entry(vote.proposal_id.clone())
            .or_default()
            .entry(vote.voter_wallet.clone())
        {
            Entry::Occupied(_) => Err(StoreError::Duplicate(format!(
                "vote by {} on {}",
                vote.voter_wallet, vote.proposal_id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(vote.clone());
                Ok(VoteInsert::Inserted)
            }
        }
    }

    fn get_vote(
        &self,
        proposal: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<Option<Vote>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .votes
            .get(proposal)
            .and_then(|m| m.get(voter))
            .cloned())
    }

    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .votes
            .get(proposal)
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default())
    }
}
