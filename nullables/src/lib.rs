//! Nullable infrastructure for deterministic testing.
//!
//! Every external dependency of the voting engine (clock, storage,
//! directories, notification sink, signature check) sits behind a trait.
//! This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Only ever a dev-dependency: the accept-all verifier must not be linked
//! into a deployed binary.

pub mod clock;
pub mod directory;
pub mod notify;
pub mod store;
pub mod verifier;

pub use clock::NullClock;
pub use directory::{NullSquadDirectory, NullVoterDirectory};
pub use notify::NullNotifier;
pub use store::NullStore;
pub use verifier::NullVerifier;
