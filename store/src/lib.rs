//! Abstract storage traits for squad proposal voting.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod error;
pub mod governance;

pub use error::StoreError;
pub use governance::{Conditional, GovernanceStore, VoteInsert};
