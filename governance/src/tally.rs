//! Weighted tally computation.
//!
//! Tallies are always recomputed from the full set of committed votes, never
//! adjusted incrementally, so a recompute can only ever converge on the
//! exact value.

use std::collections::BTreeSet;

use squad_types::{Proposal, ProposalStatus, Tally, Vote, VoteChoice};
use thiserror::Error;

/// A weight sum did not fit in `u64`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("tally weight overflow")]
pub struct TallyOverflow;

/// Sum vote weights per choice.
pub fn compute_tally(votes: &[Vote]) -> Result<Tally, TallyOverflow> {
    let mut tally = Tally::default();
    let mut voters = BTreeSet::new();
    for vote in votes {
        let bucket = match vote.choice {
            VoteChoice::Up => &mut tally.up_weight,
            VoteChoice::Down => &mut tally.down_weight,
            VoteChoice::Abstain => &mut tally.abstain_weight,
        };
        *bucket = bucket.checked_add(vote.weight).ok_or(TallyOverflow)?;
        tally.total_weight = tally
            .total_weight
            .checked_add(vote.weight)
            .ok_or(TallyOverflow)?;
        voters.insert(&vote.voter_wallet);
    }
    tally.voter_count = voters.len() as u64;
    Ok(tally)
}

/// Whether writing the current tally should flip the broadcast flag.
pub fn should_broadcast(proposal: &Proposal, threshold: u64) -> bool {
    proposal.status == ProposalStatus::Active
        && !proposal.broadcasted
        && proposal.tally.up_weight >= threshold
}

/// What a recount changed on a proposal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Recount {
    /// The record differs from what was stored.
    pub changed: bool,
    /// This recount flipped `broadcasted` to true.
    pub broadcast: bool,
}

/// Recompute the tally onto `proposal` and flip the broadcast flag if the
/// threshold is now met.
pub(crate) fn recount(
    proposal: &mut Proposal,
    votes: &[Vote],
    broadcast_threshold: u64,
) -> Result<Recount, TallyOverflow> {
    let tally = compute_tally(votes)?;
    let changed = tally != proposal.tally;
    proposal.tally = tally;
    let broadcast = should_broadcast(proposal, broadcast_threshold);
    if broadcast {
        proposal.broadcasted = true;
    }
    Ok(Recount {
        changed: changed || broadcast,
        broadcast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_types::{ProposalId, SquadId, Timestamp, VoteId, WalletAddress};

    fn vote(wallet: &str, choice: VoteChoice, weight: u64) -> Vote {
        Vote {
            id: VoteId::new(wallet),
            proposal_id: ProposalId::new("p1"),
            voter_wallet: WalletAddress::new(wallet),
            voter_user_id: None,
            squad_id: SquadId::new("s1"),
            choice,
            weight,
            cast_at: Timestamp::new(1),
        }
    }

    fn active_proposal() -> Proposal {
        Proposal {
            id: ProposalId::new("p1"),
            squad_id: SquadId::new("s1"),
            slug: "p1".into(),
            title: "t".into(),
            leader_wallet: WalletAddress::new("leader"),
            status: ProposalStatus::Active,
            broadcasted: false,
            epoch_start: Timestamp::new(0),
            epoch_end: Timestamp::new(100),
            tally: Tally::default(),
            created_at: Timestamp::new(0),
        }
    }

    #[test]
    fn test_tally_groups_by_choice() {
        let votes = [
            vote("a", VoteChoice::Up, 600),
            vote("b", VoteChoice::Down, 200),
            vote("c", VoteChoice::Abstain, 50),
            vote("d", VoteChoice::Up, 500),
        ];
        let t = compute_tally(&votes).unwrap();
        assert_eq!(t.up_weight, 1100);
        assert_eq!(t.down_weight, 200);
        assert_eq!(t.abstain_weight, 50);
        assert_eq!(t.total_weight, 1350);
        assert_eq!(t.voter_count, 4);
        assert_eq!(t.net_weight(), 900);
    }

    #[test]
    fn test_empty_tally() {
        assert_eq!(compute_tally(&[]).unwrap(), Tally::default());
    }

    #[test]
    fn test_overflow_detected() {
        let votes = [vote("a", VoteChoice::Up, u64::MAX), vote("b", VoteChoice::Down, 1)];
        assert_eq!(compute_tally(&votes), Err(TallyOverflow));
        assert_eq!(TallyOverflow.to_string(), "tally weight overflow");
    }

    #[test]
    fn test_recount_flips_broadcast_once() {
        let mut p = active_proposal();
        let first = recount(&mut p, &[vote("a", VoteChoice::Up, 600)], 1000).unwrap();
        assert!(first.changed && !first.broadcast);

        let votes = [vote("a", VoteChoice::Up, 600), vote("b", VoteChoice::Up, 500)];
        let second = recount(&mut p, &votes, 1000).unwrap();
        assert!(second.broadcast);
        assert!(p.broadcasted);

        let third = recount(&mut p, &votes, 1000).unwrap();
        assert_eq!(third, Recount::default());
    }

    #[test]
    fn test_no_broadcast_after_terminal() {
        let mut p = active_proposal();
        p.status = ProposalStatus::Succeeded;
        let r = recount(&mut p, &[vote("a", VoteChoice::Up, 5000)], 1000).unwrap();
        assert!(!r.broadcast);
        assert!(!p.broadcasted);
    }

    #[test]
    fn test_down_weight_does_not_count_towards_broadcast() {
        let mut p = active_proposal();
        let r = recount(&mut p, &[vote("a", VoteChoice::Down, 5000)], 1000).unwrap();
        assert!(!r.broadcast);
    }
}
