//! Voter eligibility: reputation floor and squad membership.

use squad_directory::{DirectoryError, SquadDirectory, Voter};
use squad_types::{Proposal, WalletAddress};
use tracing::warn;

use crate::GovernanceError;

/// The voter must hold at least `min_points` reputation.
pub fn check_reputation(voter: &Voter, min_points: u64) -> Result<(), GovernanceError> {
    if voter.points < min_points {
        return Err(GovernanceError::InsufficientReputation {
            have: voter.points,
            need: min_points,
        });
    }
    Ok(())
}

/// The voter must belong to the proposal's squad.
///
/// A squad that cannot be resolved (lookup failure or unknown squad) does not
/// block the vote; it is logged and the vote is allowed.
pub async fn check_membership(
    squads: &dyn SquadDirectory,
    proposal: &Proposal,
    wallet: &WalletAddress,
) -> Result<(), GovernanceError> {
    match squads.get_squad(&proposal.squad_id).await {
        Ok(squad) if squad.is_member(wallet) => Ok(()),
        Ok(_) => Err(GovernanceError::NotSquadMember(wallet.to_string())),
        Err(DirectoryError::NotFound(_)) => {
            warn!(
                proposal = %proposal.id,
                squad = %proposal.squad_id,
                "squad not found, allowing vote"
            );
            Ok(())
        }
        Err(e) => {
            warn!(
                proposal = %proposal.id,
                squad = %proposal.squad_id,
                error = %e,
                "squad lookup failed, allowing vote"
            );
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squad_directory::Squad;
    use squad_nullables::NullSquadDirectory;
    use squad_types::{ProposalId, ProposalStatus, SquadId, Tally, Timestamp};

    fn proposal() -> Proposal {
        Proposal {
            id: ProposalId::new("p1"),
            squad_id: SquadId::new("s1"),
            slug: "p1".into(),
            title: "t".into(),
            leader_wallet: WalletAddress::new("Leader"),
            status: ProposalStatus::Active,
            broadcasted: false,
            epoch_start: Timestamp::new(0),
            epoch_end: Timestamp::new(100),
            tally: Tally::default(),
            created_at: Timestamp::new(0),
        }
    }

    #[test]
    fn test_reputation_floor_is_inclusive() {
        let voter = |points| Voter {
            user_id: None,
            wallet: WalletAddress::new("w"),
            points,
        };
        assert!(check_reputation(&voter(500), 500).is_ok());
        assert!(matches!(
            check_reputation(&voter(499), 500),
            Err(GovernanceError::InsufficientReputation { have: 499, need: 500 })
        ));
    }

    #[tokio::test]
    async fn test_membership() {
        let squads = NullSquadDirectory::new();
        squads.add_squad(Squad {
            id: SquadId::new("s1"),
            leader_wallet: WalletAddress::new("Leader"),
            member_wallets: vec![WalletAddress::new("Member")],
        });
        let p = proposal();
        assert!(check_membership(&squads, &p, &WalletAddress::new("Member")).await.is_ok());
        assert!(matches!(
            check_membership(&squads, &p, &WalletAddress::new("Outsider")).await,
            Err(GovernanceError::NotSquadMember(_))
        ));
    }

    #[tokio::test]
    async fn test_unresolvable_squad_allows_vote() {
        let squads = NullSquadDirectory::new();
        let p = proposal();
        assert!(check_membership(&squads, &p, &WalletAddress::new("Anyone")).await.is_ok());
        squads.set_unavailable(true);
        assert!(check_membership(&squads, &p, &WalletAddress::new("Anyone")).await.is_ok());
    }
}
