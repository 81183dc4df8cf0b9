//! Blake2b hashing.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use squad_types::{ProposalId, VoteId, WalletAddress};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Deterministic id of the single vote slot `(proposal, voter)`.
///
/// The proposal id is length-prefixed so distinct pairs cannot collide by
/// shifting bytes between the two fields.
pub fn vote_id(proposal: &ProposalId, voter: &WalletAddress) -> VoteId {
    let len = (proposal.as_str().len() as u64).to_be_bytes();
    let digest = blake2b_256_multi(&[
        b"squad-vote-id",
        &len,
        proposal.as_str().as_bytes(),
        voter.as_str().as_bytes(),
    ]);
    VoteId::new(hex::encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multi_equals_concatenation() {
        assert_eq!(blake2b_256_multi(&[b"ab", b"cd"]), blake2b_256(b"abcd"));
    }

    #[test]
    fn vote_id_is_stable_hex() {
        let p = ProposalId::new("p1");
        let w = WalletAddress::new("4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T");
        let id = vote_id(&p, &w);
        assert_eq!(id, vote_id(&p, &w));
        assert_eq!(id.as_str().len(), 64);
    }

    #[test]
    fn vote_id_separates_fields() {
        let a = vote_id(&ProposalId::new("p1"), &WalletAddress::new("2abc"));
        let b = vote_id(&ProposalId::new("p12"), &WalletAddress::new("abc"));
        assert_ne!(a, b);
    }
}
