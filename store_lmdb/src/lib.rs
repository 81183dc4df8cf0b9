//! LMDB storage backend for squad governance.
//!
//! Implements [`squad_store::GovernanceStore`] using the `heed` LMDB bindings.
//! Proposals, the slug index and the vote ledger live in separate named
//! databases inside a single environment, so every check-and-write the store
//! performs runs in one serialized write transaction.

pub mod environment;
pub mod error;
pub mod governance;
pub mod integrity;
mod meta;

pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use governance::LmdbGovernanceStore;
pub use integrity::{check_data_dir, IntegrityReport};
