use serde::{Deserialize, Serialize};
use squad_types::{ProposalId, ProposalStatus, SquadId, WalletAddress};

/// A voter as known to the reputation directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voter {
    #[serde(default)]
    pub user_id: Option<String>,
    pub wallet: WalletAddress,
    /// Current reputation. Read once per cast and frozen into the vote.
    pub points: u64,
}

/// A squad and its membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squad {
    pub id: SquadId,
    pub leader_wallet: WalletAddress,
    #[serde(default)]
    pub member_wallets: Vec<WalletAddress>,
}

impl Squad {
    pub fn is_member(&self, wallet: &WalletAddress) -> bool {
        self.member_wallets.iter().any(|w| w == wallet)
    }
}

/// Events delivered to the notification sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    /// Up-weight crossed the broadcast threshold. Fires once per proposal.
    BroadcastReached { proposal_id: ProposalId },
    /// A proposal reached a terminal state.
    ProposalClosed {
        proposal_id: ProposalId,
        status: ProposalStatus,
    },
}

impl NotificationEvent {
    pub fn proposal_id(&self) -> &ProposalId {
        match self {
            Self::BroadcastReached { proposal_id } | Self::ProposalClosed { proposal_id, .. } => {
                proposal_id
            }
        }
    }
}
