//! Parse and validation errors for the fundamental types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("invalid vote choice: {0:?} (expected up, down or abstain)")]
    InvalidChoice(String),

    #[error("invalid proposal status: {0:?}")]
    InvalidStatus(String),

    #[error("invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
}
