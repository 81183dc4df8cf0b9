//! Shared fixtures: an engine wired to nullables and real Ed25519 keys.

#![allow(dead_code)]

use std::sync::Arc;

use squad_crypto::{encode_address, encode_signature, keypair_from_seed, sign_message, Ed25519Verifier, SignatureVerifier};
use squad_directory::Squad;
use squad_governance::{CastVote, GovernanceParams, VoteEngine};
use squad_nullables::{NullClock, NullNotifier, NullSquadDirectory, NullStore, NullVoterDirectory};
use squad_store::GovernanceStore;
use squad_types::{
    KeyPair, Proposal, ProposalId, ProposalStatus, SquadId, Tally, Timestamp, WalletAddress,
};

/// Fixed "now" for every test, in seconds.
pub const NOW: u64 = 1_700_000_000;
pub const PROPOSAL_ID: &str = "665f1c2a9b3e4d0012345678";
pub const SLUG: &str = "fund-the-meetup";
pub const SQUAD: &str = "squad-1";
pub const LEADER_SEED: u8 = 100;

pub struct Harness {
    pub engine: Arc<VoteEngine>,
    pub store: Arc<NullStore>,
    pub voters: Arc<NullVoterDirectory>,
    pub squads: Arc<NullSquadDirectory>,
    pub notifier: Arc<NullNotifier>,
    pub clock: Arc<NullClock>,
}

pub fn keypair(seed: u8) -> KeyPair {
    keypair_from_seed(&[seed; 32])
}

pub fn wallet(seed: u8) -> WalletAddress {
    encode_address(&keypair(seed).public)
}

pub fn params(broadcast_threshold: u64) -> GovernanceParams {
    GovernanceParams {
        broadcast_threshold,
        ..GovernanceParams::default()
    }
}

pub fn harness() -> Harness {
    harness_with(GovernanceParams::default(), Arc::new(Ed25519Verifier))
}

pub fn harness_with(params: GovernanceParams, verifier: Arc<dyn SignatureVerifier>) -> Harness {
    let store = Arc::new(NullStore::new());
    harness_on(store.clone(), store, params, verifier)
}

/// Build a harness over any store; `null_store` is kept for failure injection.
pub fn harness_on(
    backend: Arc<dyn GovernanceStore>,
    null_store: Arc<NullStore>,
    params: GovernanceParams,
    verifier: Arc<dyn SignatureVerifier>,
) -> Harness {
    let voters = Arc::new(NullVoterDirectory::new());
    let squads = Arc::new(NullSquadDirectory::new());
    let notifier = Arc::new(NullNotifier::new());
    let clock = Arc::new(NullClock::new(NOW));
    let engine = Arc::new(VoteEngine::new(
        backend,
        voters.clone(),
        squads.clone(),
        notifier.clone(),
        verifier,
        clock.clone(),
        params,
    ));
    Harness {
        engine,
        store: null_store,
        voters,
        squads,
        notifier,
        clock,
    }
}

pub fn proposal(status: ProposalStatus) -> Proposal {
    Proposal {
        id: ProposalId::new(PROPOSAL_ID),
        squad_id: SquadId::new(SQUAD),
        slug: SLUG.to_string(),
        title: "Fund the community meetup".to_string(),
        leader_wallet: wallet(LEADER_SEED),
        status,
        broadcasted: false,
        epoch_start: Timestamp::new(NOW - 100),
        epoch_end: Timestamp::new(NOW + 3_600),
        tally: Tally::default(),
        created_at: Timestamp::new(NOW - 200),
    }
}

impl Harness {
    /// Register the standard active proposal and a squad containing `members`.
    pub fn seed(&self, members: &[u8]) -> Proposal {
        let p = self
            .engine
            .register(proposal(ProposalStatus::Active))
            .unwrap();
        self.squads.add_squad(Squad {
            id: SquadId::new(SQUAD),
            leader_wallet: wallet(LEADER_SEED),
            member_wallets: members.iter().map(|s| wallet(*s)).collect(),
        });
        p
    }

    pub fn give_points(&self, seed: u8, points: u64) {
        self.voters.set_points(&wallet(seed), points);
    }

    pub fn now_ms(&self) -> u64 {
        use squad_types::Clock;
        self.clock.now().as_secs() * 1000
    }
}

/// A vote request on `reference` signed by the key with `seed`.
pub fn signed_vote(seed: u8, reference: &str, choice: &str, issued_at_ms: u64) -> CastVote {
    let kp = keypair(seed);
    let voter = encode_address(&kp.public);
    let message = format!("squad-vote|{reference}|{choice}|{voter}|{issued_at_ms}");
    let signature = encode_signature(&sign_message(message.as_bytes(), &kp.private));
    CastVote {
        reference: reference.to_string(),
        choice: choice.to_string(),
        signature,
        message,
    }
}

/// A signed cancel message: `(signature, message)`.
pub fn signed_cancel(seed: u8, reference: &str, issued_at_ms: u64) -> (String, String) {
    let kp = keypair(seed);
    let leader = encode_address(&kp.public);
    let message = format!("squad-cancel|{reference}|{leader}|{issued_at_ms}");
    let signature = encode_signature(&sign_message(message.as_bytes(), &kp.private));
    (signature, message)
}
