//! Denormalized weighted tally carried on each proposal.

use serde::{Deserialize, Serialize};

use crate::VoteChoice;

/// Aggregate weights of the votes cast on a proposal.
///
/// Only the tally engine writes this; it always equals a full recomputation
/// over the proposal's votes once the engine has run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub up_weight: u64,
    pub down_weight: u64,
    pub abstain_weight: u64,
    /// `up_weight + down_weight + abstain_weight`.
    pub total_weight: u64,
    /// Number of distinct voters.
    pub voter_count: u64,
}

impl Tally {
    /// Weight recorded for a single choice.
    pub fn weight_for(&self, choice: VoteChoice) -> u64 {
        match choice {
            VoteChoice::Up => self.up_weight,
            VoteChoice::Down => self.down_weight,
            VoteChoice::Abstain => self.abstain_weight,
        }
    }

    /// Up weight minus down weight.
    pub fn net_weight(&self) -> i128 {
        i128::from(self.up_weight) - i128::from(self.down_weight)
    }

    /// Whether the per-choice weights add up to the total.
    pub fn is_consistent(&self) -> bool {
        self.up_weight
            .checked_add(self.down_weight)
            .and_then(|w| w.checked_add(self.abstain_weight))
            == Some(self.total_weight)
    }

    pub fn is_empty(&self) -> bool {
        self.voter_count == 0
    }
}
