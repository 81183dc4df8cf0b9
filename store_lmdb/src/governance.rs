//! LMDB implementation of GovernanceStore.
//!
//! Key formats:
//! - `proposals`: proposal id bytes
//! - `proposal_slugs`: slug bytes, value is the proposal id
//! - `votes`: `u32 BE len(proposal id) ++ proposal id ++ wallet`
//!
//! The length prefix makes every proposal's votes a contiguous range that no
//! other proposal id can share, so per-proposal scans are plain prefix ranges.
//! Uniqueness of ids, slugs and `(proposal, wallet)` pairs is enforced with
//! `NO_OVERWRITE` puts, never by an earlier read. An id may not equal another
//! proposal's slug; that check runs inside the inserting write transaction.

use std::ops::Bound;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, MdbError, PutFlags, RoTxn, RwTxn};
use tracing::trace;

use squad_store::{Conditional, GovernanceStore, StoreError, VoteInsert};
use squad_types::{Proposal, ProposalId, ProposalStatus, Vote, WalletAddress};

use crate::LmdbError;

pub struct LmdbGovernanceStore {
    pub(crate) env: Arc<Env>,
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    pub(crate) slugs_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
}

fn vote_prefix(proposal: &ProposalId) -> Vec<u8> {
    let id = proposal.as_str().as_bytes();
    let mut key = Vec::with_capacity(4 + id.len() + 44);
    key.extend_from_slice(&(id.len() as u32).to_be_bytes());
    key.extend_from_slice(id);
    key
}

fn vote_key(proposal: &ProposalId, voter: &WalletAddress) -> Vec<u8> {
    let mut key = vote_prefix(proposal);
    key.extend_from_slice(voter.as_str().as_bytes());
    key
}

/// Increment a byte prefix to get the exclusive upper bound for range scans.
fn increment_prefix(prefix: &mut Vec<u8>) {
    while let Some(last) = prefix.last_mut() {
        if *last < 0xFF {
            *last += 1;
            return;
        }
        prefix.pop();
    }
}

/// Put `value` under `key` unless the key already exists.
///
/// Returns `false` when the key was taken; nothing is written in that case.
fn put_unique(
    db: &Database<Bytes, Bytes>,
    wtxn: &mut RwTxn,
    key: &[u8],
    value: &[u8],
) -> Result<bool, LmdbError> {
    match db.put_with_flags(wtxn, PutFlags::NO_OVERWRITE, key, value) {
        Ok(()) => Ok(true),
        Err(heed::Error::Mdb(MdbError::KeyExist)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

impl LmdbGovernanceStore {
    fn read_proposal(&self, txn: &RoTxn, id: &ProposalId) -> Result<Proposal, LmdbError> {
        let raw = self
            .proposals_db
            .get(txn, id.as_str().as_bytes())?
            .ok_or_else(|| LmdbError::NotFound(format!("proposal {id}")))?;
        Ok(bincode::deserialize(raw)?)
    }

    fn scan_votes(&self, txn: &RoTxn, proposal: &ProposalId) -> Result<Vec<Vote>, LmdbError> {
        let prefix = vote_prefix(proposal);
        let mut upper = prefix.clone();
        increment_prefix(&mut upper);

        let bounds = (
            Bound::Included(prefix.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let mut votes = Vec::new();
        for result in self.votes_db.range(txn, &bounds)? {
            let (_key, val) = result?;
            votes.push(bincode::deserialize(val)?);
        }
        Ok(votes)
    }
}

impl GovernanceStore for LmdbGovernanceStore {
    fn insert_proposal(&self, proposal: &Proposal) -> Result<(), StoreError> {
        let bytes = bincode::serialize(proposal).map_err(LmdbError::from)?;
        let id = proposal.id.as_str().as_bytes();

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if !put_unique(&self.proposals_db, &mut wtxn, id, &bytes)? {
            return Err(StoreError::Duplicate(format!("proposal {}", proposal.id)));
        }
        if !put_unique(&self.slugs_db, &mut wtxn, proposal.slug.as_bytes(), id)? {
            // Dropping the transaction aborts the proposal put as well.
            return Err(StoreError::Duplicate(format!("slug {}", proposal.slug)));
        }
        // References resolve by id first, then by slug, so the two keyspaces
        // must not overlap across proposals.
        if proposal.slug.as_bytes() != id
            && self
                .proposals_db
                .get(&wtxn, proposal.slug.as_bytes())
                .map_err(LmdbError::from)?
                .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "slug {} is the id of another proposal",
                proposal.slug
            )));
        }
        if let Some(owner) = self.slugs_db.get(&wtxn, id).map_err(LmdbError::from)? {
            if owner != id {
                return Err(StoreError::Duplicate(format!(
                    "proposal id {} is the slug of another proposal",
                    proposal.id
                )));
            }
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_proposal(&self, id: &ProposalId) -> Result<Proposal, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.read_proposal(&rtxn, id)?)
    }

    fn find_proposal_by_slug(&self, slug: &str) -> Result<Option<Proposal>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id = match self
            .slugs_db
            .get(&rtxn, slug.as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(raw) => std::str::from_utf8(raw)
                .map(ProposalId::new)
                .map_err(|e| LmdbError::Corruption(format!("slug index entry: {e}")))?,
            None => return Ok(None),
        };
        match self.read_proposal(&rtxn, &id) {
            Ok(p) => Ok(Some(p)),
            Err(LmdbError::NotFound(_)) => Err(StoreError::Corruption(format!(
                "slug {slug} points at missing proposal {id}"
            ))),
            Err(e) => Err(e.into()),
        }
    }

    fn list_proposals(&self, status: ProposalStatus) -> Result<Vec<Proposal>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut results = Vec::new();
        for result in self.proposals_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_key, val) = result.map_err(LmdbError::from)?;
            let proposal: Proposal = bincode::deserialize(val).map_err(LmdbError::from)?;
            if proposal.status == status {
                results.push(proposal);
            }
        }
        Ok(results)
    }

    fn update_proposal(
        &self,
        id: &ProposalId,
        update: &mut dyn FnMut(&mut Proposal, &[Vote]) -> bool,
    ) -> Result<Conditional, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let current = self.read_proposal(&wtxn, id)?;
        let votes = self.scan_votes(&wtxn, id)?;

        let mut next = current.clone();
        if !update(&mut next, &votes) {
            return Ok(Conditional::Declined(current));
        }
        if next.id != current.id || next.slug != current.slug {
            return Err(StoreError::Backend(format!(
                "update of proposal {id} may not change its keys"
            )));
        }

        let bytes = bincode::serialize(&next).map_err(LmdbError::from)?;
        self.proposals_db
            .put(&mut wtxn, id.as_str().as_bytes(), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        trace!(proposal = %id, status = %next.status, "proposal updated");
        Ok(Conditional::Applied(next))
    }

    fn insert_vote(
        &self,
        vote: &Vote,
        admit: &dyn Fn(&Proposal) -> bool,
    ) -> Result<VoteInsert, StoreError> {
        let bytes = bincode::serialize(vote).map_err(LmdbError::from)?;
        let key = vote_key(&vote.proposal_id, &vote.voter_wallet);

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let proposal = self.read_proposal(&wtxn, &vote.proposal_id)?;
        if !admit(&proposal) {
            return Ok(VoteInsert::Refused(proposal));
        }
        if !put_unique(&self.votes_db, &mut wtxn, &key, &bytes)? {
            return Err(StoreError::Duplicate(format!(
                "vote by {} on {}",
                vote.voter_wallet, vote.proposal_id
            )));
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(VoteInsert::Inserted)
    }

    fn get_vote(
        &self,
        proposal: &ProposalId,
        voter: &WalletAddress,
    ) -> Result<Option<Vote>, StoreError> {
        let key = vote_key(proposal, voter);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.votes_db.get(&rtxn, &key).map_err(LmdbError::from)? {
            Some(val) => Ok(Some(bincode::deserialize(val).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn get_votes(&self, proposal: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.scan_votes(&rtxn, proposal)?)
    }

    fn vote_count(&self, proposal: &ProposalId) -> Result<u64, StoreError> {
        let prefix = vote_prefix(proposal);
        let mut upper = prefix.clone();
        increment_prefix(&mut upper);

        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let bounds = (
            Bound::Included(prefix.as_slice()),
            Bound::Excluded(upper.as_slice()),
        );
        let mut count = 0u64;
        for result in self.votes_db.range(&rtxn, &bounds).map_err(LmdbError::from)? {
            result.map_err(LmdbError::from)?;
            count += 1;
        }
        Ok(count)
    }
}
