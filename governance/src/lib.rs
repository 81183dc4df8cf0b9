//! Squad proposal voting.
//!
//! Wallets cast reputation-weighted votes on squad proposals by signing a
//! tagged message. The engine authenticates the message, checks the
//! voter's eligibility, records the vote in the ledger (at most one per
//! voter per proposal), recomputes the weighted tally and fires a one-time
//! broadcast notification once the up-weight crosses a threshold.
//!
//! Proposal state lives in storage only. [`VoteEngine`] holds collaborators
//! and parameters, and every concurrent-safety guarantee is delegated to
//! conditional writes in [`squad_store::GovernanceStore`].

pub mod auth;
mod cancel;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod message;
pub mod params;
pub mod tally;

pub use auth::Authenticator;
pub use engine::{CastReceipt, CastVote, VoteEngine};
pub use error::{CancelRefusal, ErrorKind, GovernanceError};
pub use lifecycle::{voting_open, NetWeightPolicy, OutcomePolicy};
pub use message::{CancelMessage, VoteMessage, CANCEL_TAG, VOTE_TAG};
pub use params::GovernanceParams;
pub use tally::{compute_tally, should_broadcast, TallyOverflow};
