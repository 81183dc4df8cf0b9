use squad_directory::DirectoryError;
use squad_store::StoreError;
use squad_types::{ProposalStatus, TypeError};
use std::fmt;
use thiserror::Error;

/// Coarse classification of a failure, used to pick a response status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    Conflict,
    NotFound,
    /// Storage or directory unavailable. Retryable.
    Dependency,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Dependency => "dependency",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::Authentication => 401,
            Self::Authorization => 403,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Dependency => 503,
        }
    }
}

/// Why a cancellation was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelRefusal {
    NotLeader,
    VotesCast,
    NotActive,
}

impl fmt::Display for CancelRefusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotLeader => "only the squad leader can cancel a proposal",
            Self::VotesCast => "cannot cancel a proposal that has votes",
            Self::NotActive => "only active proposals can be cancelled",
        })
    }
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("invalid vote choice {0:?}, must be one of: up, down, abstain")]
    InvalidChoice(String),

    #[error("malformed signed message: {0}")]
    MalformedMessage(String),

    #[error("signed message expired ({age_secs}s old, limit {max_age_secs}s), please sign again")]
    MessageExpired { age_secs: u64, max_age_secs: u64 },

    #[error("invalid proposal reference: {0}")]
    InvalidReference(String),

    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("invalid wallet signature")]
    InvalidSignature,

    #[error("you need at least {need} points to vote (have {have})")]
    InsufficientReputation { have: u64, need: u64 },

    #[error("wallet {0} is not a member of the proposal's squad")]
    NotSquadMember(String),

    #[error("voting is closed for proposal {0}")]
    VotingClosed(String),

    #[error("proposal {0} not found")]
    ProposalNotFound(String),

    #[error("wallet {voter} has already voted on proposal {proposal}")]
    DuplicateVote { proposal: String, voter: String },

    #[error("{0}")]
    Forbidden(CancelRefusal),

    #[error("invalid transition {from} -> {to}")]
    InvalidTransition {
        from: ProposalStatus,
        to: ProposalStatus,
    },

    #[error("proposal {0} already exists")]
    DuplicateProposal(String),

    #[error("dependency unavailable: {0}")]
    Dependency(String),
}

impl GovernanceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidChoice(_)
            | Self::MalformedMessage(_)
            | Self::MessageExpired { .. }
            | Self::InvalidReference(_)
            | Self::InvalidProposal(_) => ErrorKind::Validation,
            Self::InvalidSignature => ErrorKind::Authentication,
            Self::InsufficientReputation { .. }
            | Self::NotSquadMember(_)
            | Self::VotingClosed(_)
            | Self::Forbidden(_) => ErrorKind::Authorization,
            Self::DuplicateVote { .. }
            | Self::InvalidTransition { .. }
            | Self::DuplicateProposal(_) => ErrorKind::Conflict,
            Self::ProposalNotFound(_) => ErrorKind::NotFound,
            Self::Dependency(_) => ErrorKind::Dependency,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}

impl From<StoreError> for GovernanceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(what) => GovernanceError::ProposalNotFound(what),
            other => GovernanceError::Dependency(other.to_string()),
        }
    }
}

impl From<DirectoryError> for GovernanceError {
    fn from(e: DirectoryError) -> Self {
        GovernanceError::Dependency(e.to_string())
    }
}

impl From<TypeError> for GovernanceError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::InvalidChoice(raw) => GovernanceError::InvalidChoice(raw),
            other => GovernanceError::MalformedMessage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(GovernanceError::InvalidChoice("x".into()).status_code(), 400);
        assert_eq!(GovernanceError::InvalidSignature.status_code(), 401);
        assert_eq!(
            GovernanceError::Forbidden(CancelRefusal::VotesCast).status_code(),
            403
        );
        assert_eq!(GovernanceError::ProposalNotFound("p".into()).status_code(), 404);
        assert_eq!(
            GovernanceError::DuplicateVote {
                proposal: "p".into(),
                voter: "w".into()
            }
            .status_code(),
            409
        );
        assert_eq!(GovernanceError::Dependency("db".into()).status_code(), 503);
    }

    #[test]
    fn test_store_not_found_maps_to_proposal_not_found() {
        let err: GovernanceError = StoreError::NotFound("proposal p1".into()).into();
        assert!(matches!(err, GovernanceError::ProposalNotFound(_)));
        let err: GovernanceError = StoreError::Backend("disk".into()).into();
        assert_eq!(err.kind(), ErrorKind::Dependency);
    }
}
