//! Fundamental types for squad proposal voting.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! wallet addresses, identifiers, keys, timestamps, and the proposal/vote records
//! persisted by the storage layer.

pub mod address;
pub mod error;
pub mod ids;
pub mod keys;
pub mod proposal;
pub mod tally;
pub mod time;
pub mod vote;

pub use address::WalletAddress;
pub use error::TypeError;
pub use ids::{validate_identifier, ProposalId, SquadId, VoteId, MAX_IDENTIFIER_LEN};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use proposal::{Proposal, ProposalStatus};
pub use tally::Tally;
pub use time::{Clock, SystemClock, Timestamp};
pub use vote::{Vote, VoteChoice};
