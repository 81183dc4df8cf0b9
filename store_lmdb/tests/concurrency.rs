//! Contention tests against a real LMDB environment.

use std::sync::{Arc, Barrier};
use std::thread;

use squad_store::{GovernanceStore, StoreError, VoteInsert};
use squad_store_lmdb::LmdbEnvironment;
use squad_types::{
    Proposal, ProposalId, ProposalStatus, SquadId, Tally, Timestamp, Vote, VoteChoice, VoteId,
    WalletAddress,
};

fn proposal() -> Proposal {
    Proposal {
        id: ProposalId::new("p1"),
        squad_id: SquadId::new("squad-1"),
        slug: "p1-slug".to_string(),
        title: "Treasury top-up".to_string(),
        leader_wallet: WalletAddress::new("LeaderWallet1111111111111111111111"),
        status: ProposalStatus::Active,
        broadcasted: false,
        epoch_start: Timestamp::new(0),
        epoch_end: Timestamp::new(10_000),
        tally: Tally::default(),
        created_at: Timestamp::new(0),
    }
}

fn vote(wallet: &str, weight: u64) -> Vote {
    Vote {
        id: VoteId::new(format!("v-{wallet}")),
        proposal_id: ProposalId::new("p1"),
        voter_wallet: WalletAddress::new(wallet),
        voter_user_id: None,
        squad_id: SquadId::new("squad-1"),
        choice: VoteChoice::Up,
        weight,
        cast_at: Timestamp::new(5),
    }
}

#[test]
fn concurrent_inserts_for_one_voter_store_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
    let store = Arc::new(env.governance_store());
    store.insert_proposal(&proposal()).unwrap();

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.insert_vote(&vote("SameWallet", 100 + i as u64), &|p| {
                    p.status == ProposalStatus::Active
                })
            })
        })
        .collect();

    let mut inserted = 0;
    let mut duplicates = 0;
    for h in handles {
        match h.join().unwrap() {
            Ok(VoteInsert::Inserted) => inserted += 1,
            Err(StoreError::Duplicate(_)) => duplicates += 1,
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
    assert_eq!(inserted, 1);
    assert_eq!(duplicates, threads - 1);
    assert_eq!(store.vote_count(&ProposalId::new("p1")).unwrap(), 1);
}

#[test]
fn cancel_guard_and_vote_are_mutually_exclusive() {
    let dir = tempfile::tempdir().unwrap();
    let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
    let store = Arc::new(env.governance_store());
    store.insert_proposal(&proposal()).unwrap();
    let id = ProposalId::new("p1");

    let barrier = Arc::new(Barrier::new(2));
    let voter = {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            store.insert_vote(&vote("VoterWallet", 700), &|p| {
                p.status == ProposalStatus::Active
            })
        })
    };
    let canceller = {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        let id = id.clone();
        thread::spawn(move || {
            barrier.wait();
            store.update_proposal(&id, &mut |p, votes| {
                if !votes.is_empty() || p.status != ProposalStatus::Active {
                    return false;
                }
                p.status = ProposalStatus::Cancelled;
                true
            })
        })
    };

    let voted = matches!(voter.join().unwrap().unwrap(), VoteInsert::Inserted);
    let cancelled = canceller.join().unwrap().unwrap().is_applied();
    assert!(voted ^ cancelled, "voted={voted} cancelled={cancelled}");

    let stored = store.get_proposal(&id).unwrap();
    let count = store.vote_count(&id).unwrap();
    if cancelled {
        assert_eq!(stored.status, ProposalStatus::Cancelled);
        assert_eq!(count, 0);
    } else {
        assert_eq!(stored.status, ProposalStatus::Active);
        assert_eq!(count, 1);
    }
}
