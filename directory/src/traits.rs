use async_trait::async_trait;
use squad_types::{SquadId, WalletAddress};

use crate::{DirectoryError, NotificationEvent, Squad, Voter};

/// Reputation directory.
#[async_trait]
pub trait VoterDirectory: Send + Sync {
    /// Fetch the voter for `wallet`, provisioning a record with the
    /// directory's default reputation if none exists.
    async fn get_or_create_voter(&self, wallet: &WalletAddress) -> Result<Voter, DirectoryError>;
}

/// Squad membership directory.
#[async_trait]
pub trait SquadDirectory: Send + Sync {
    /// Fails with [`DirectoryError::NotFound`] for an unknown squad.
    async fn get_squad(&self, id: &SquadId) -> Result<Squad, DirectoryError>;
}

/// Best-effort event sink. Must not block the caller.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, event: NotificationEvent);
}
