//! Deterministic Ed25519 key derivation.
//!
//! The server never holds voter keys; these helpers exist for clients, tooling
//! and tests that need to produce signed vote messages.

use ed25519_dalek::SigningKey;
use squad_types::{KeyPair, PrivateKey, PublicKey};

/// Derive a key pair from a 32-byte seed.
pub fn keypair_from_seed(seed: &[u8; 32]) -> KeyPair {
    let signing_key = SigningKey::from_bytes(seed);
    KeyPair {
        public: PublicKey(signing_key.verifying_key().to_bytes()),
        private: PrivateKey(signing_key.to_bytes()),
    }
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> PublicKey {
    PublicKey(SigningKey::from_bytes(&private.0).verifying_key().to_bytes())
}
