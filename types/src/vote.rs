//! Votes and vote choices.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ProposalId, SquadId, Timestamp, TypeError, VoteId, WalletAddress};

/// What a voter chose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteChoice {
    Up,
    Down,
    Abstain,
}

impl VoteChoice {
    pub const ALL: [VoteChoice; 3] = [Self::Up, Self::Down, Self::Abstain];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Abstain => "abstain",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            "abstain" => Ok(Self::Abstain),
            other => Err(TypeError::InvalidChoice(other.to_string())),
        }
    }
}

/// A cast vote. Immutable once stored.
///
/// `weight` is the voter's reputation at the moment of casting and is never
/// recomputed, even if the voter's reputation later changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub proposal_id: ProposalId,
    pub voter_wallet: WalletAddress,
    /// Directory user id, when the directory knows one.
    pub voter_user_id: Option<String>,
    pub squad_id: SquadId,
    pub choice: VoteChoice,
    pub weight: u64,
    pub cast_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_parses_lowercase_only() {
        assert_eq!("up".parse::<VoteChoice>().unwrap(), VoteChoice::Up);
        assert_eq!("abstain".parse::<VoteChoice>().unwrap(), VoteChoice::Abstain);
        assert!("UP".parse::<VoteChoice>().is_err());
        assert!("yes".parse::<VoteChoice>().is_err());
    }

    #[test]
    fn choice_serializes_as_lowercase_string() {
        let json = serde_json::to_string(&VoteChoice::Down).unwrap();
        assert_eq!(json, "\"down\"");
    }

    #[test]
    fn vote_bincode_roundtrip() {
        let vote = Vote {
            id: VoteId::new("ab"),
            proposal_id: ProposalId::new("p1"),
            voter_wallet: WalletAddress::new("4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T"),
            voter_user_id: None,
            squad_id: SquadId::new("s1"),
            choice: VoteChoice::Up,
            weight: 600,
            cast_at: Timestamp::new(10),
        };
        let bytes = bincode::serialize(&vote).unwrap();
        let decoded: Vote = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, vote);
    }
}
