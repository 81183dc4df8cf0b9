//! Cryptographic primitives for squad voting.
//!
//! - **Ed25519** signature verification, behind the [`SignatureVerifier`] strategy
//! - **Base58** wallet addresses: the address text *is* the public key
//! - **Blake2b** for deterministic vote identifiers

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::{decode_address, decode_signature, encode_address, encode_signature, CodecError};
pub use hash::{blake2b_256, blake2b_256_multi, vote_id};
pub use keys::{keypair_from_seed, public_from_private};
pub use sign::{sign_message, verify_signature, Ed25519Verifier, SignatureVerifier};
