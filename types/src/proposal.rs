//! Proposals and their lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ProposalId, SquadId, Tally, Timestamp, TypeError, WalletAddress};

/// Lifecycle state of a proposal. Exactly one at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Authored but the voting window has not been opened yet.
    Scheduled,
    /// Accepting votes (subject to the epoch window).
    Active,
    Succeeded,
    Failed,
    /// Withdrawn by the squad leader before any vote was cast.
    Cancelled,
    Expired,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Active => "active",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    /// Terminal states are retained for audit and never left.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Cancelled | Self::Expired
        )
    }

    /// Whether a proposal in this state may accept votes at all.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// The transition table:
    /// `scheduled -> active -> {succeeded | failed | expired | cancelled}`.
    pub fn can_transition_to(&self, next: ProposalStatus) -> bool {
        matches!(
            (self, next),
            (Self::Scheduled, Self::Active)
                | (Self::Active, Self::Succeeded)
                | (Self::Active, Self::Failed)
                | (Self::Active, Self::Expired)
                | (Self::Active, Self::Cancelled)
        )
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "active" => Ok(Self::Active),
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            "expired" => Ok(Self::Expired),
            other => Err(TypeError::InvalidStatus(other.to_string())),
        }
    }
}

/// A squad proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub squad_id: SquadId,
    /// Human-readable alternate key, unique across proposals.
    pub slug: String,
    pub title: String,
    /// The only identity allowed to cancel.
    pub leader_wallet: WalletAddress,
    pub status: ProposalStatus,
    /// One-way flag, independent of `status`.
    pub broadcasted: bool,
    /// Voting window is `[epoch_start, epoch_end)`.
    pub epoch_start: Timestamp,
    pub epoch_end: Timestamp,
    pub tally: Tally,
    pub created_at: Timestamp,
}

impl Proposal {
    /// Whether `now` falls before the end of the voting window.
    pub fn window_open_at(&self, now: Timestamp) -> bool {
        now < self.epoch_end
    }
}
