//! Nullable voter and squad directories.

use async_trait::async_trait;
use squad_directory::{DirectoryError, Squad, SquadDirectory, Voter, VoterDirectory};
use squad_types::{SquadId, WalletAddress};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Reputation points given to wallets provisioned on first contact.
pub const DEFAULT_POINTS: u64 = 500;

/// In-memory voter directory that provisions unknown wallets.
pub struct NullVoterDirectory {
    voters: Mutex<HashMap<WalletAddress, Voter>>,
    default_points: u64,
    unavailable: AtomicBool,
}

impl NullVoterDirectory {
    pub fn new() -> Self {
        Self::with_default_points(DEFAULT_POINTS)
    }

    pub fn with_default_points(default_points: u64) -> Self {
        Self {
            voters: Mutex::new(HashMap::new()),
            default_points,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Create or overwrite a voter's reputation.
    pub fn set_points(&self, wallet: &WalletAddress, points: u64) {
        self.voters
            .lock()
            .unwrap()
            .entry(wallet.clone())
            .and_modify(|v| v.points = points)
            .or_insert_with(|| Voter {
                user_id: None,
                wallet: wallet.clone(),
                points,
            });
    }

    pub fn get(&self, wallet: &WalletAddress) -> Option<Voter> {
        self.voters.lock().unwrap().get(wallet).cloned()
    }

    /// Make every lookup fail as if the directory were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Default for NullVoterDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VoterDirectory for NullVoterDirectory {
    async fn get_or_create_voter(&self, wallet: &WalletAddress) -> Result<Voter, DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable("null voter directory".into()));
        }
        let voter = self
            .voters
            .lock()
            .unwrap()
            .entry(wallet.clone())
            .or_insert_with(|| Voter {
                user_id: None,
                wallet: wallet.clone(),
                points: self.default_points,
            })
            .clone();
        Ok(voter)
    }
}

/// In-memory squad directory.
#[derive(Default)]
pub struct NullSquadDirectory {
    squads: Mutex<HashMap<SquadId, Squad>>,
    unavailable: AtomicBool,
}

impl NullSquadDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_squad(&self, squad: Squad) {
        self.squads.lock().unwrap().insert(squad.id.clone(), squad);
    }

    /// Make every lookup fail as if the directory were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl SquadDirectory for NullSquadDirectory {
    async fn get_squad(&self, id: &SquadId) -> Result<Squad, DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Unreachable("null squad directory".into()));
        }
        self.squads
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(format!("squad {id}")))
    }
}
