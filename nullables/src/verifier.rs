//! Nullable signature verifier.

use squad_crypto::SignatureVerifier;
use squad_types::{PublicKey, Signature};

/// Accepts every signature. For tests that exercise everything but crypto.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullVerifier;

impl SignatureVerifier for NullVerifier {
    fn verify(&self, _message: &[u8], _signature: &Signature, _public_key: &PublicKey) -> bool {
        true
    }
}
