//! Ed25519 message signing and the verification strategy.

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use squad_types::{PrivateKey, PublicKey, Signature};

/// Decides whether `signature` over `message` was produced by `public_key`.
///
/// Production wiring always uses [`Ed25519Verifier`]. Test wiring may inject an
/// accept-all implementation (`squad_nullables::NullVerifier`); that crate is a
/// dev-dependency only and never linked into the daemon.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool;
}

/// Strict Ed25519 verification.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Verifier;

impl SignatureVerifier for Ed25519Verifier {
    fn verify(&self, message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
        verify_signature(message, signature, public_key)
    }
}

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature(signing_key.sign(message).to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Uses `verify_strict`, which also rejects small-order keys and
/// non-canonical signatures.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    verifying_key.verify_strict(message, &dalek_sig).is_ok()
}
