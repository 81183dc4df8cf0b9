//! Base58 text codecs for wallet addresses and signatures.
//!
//! Wallets use the Solana convention: the address is the base58 encoding of the
//! raw 32-byte Ed25519 public key, with no prefix or checksum. Signatures travel
//! as base58 of the 64 raw signature bytes.

use squad_types::{PublicKey, Signature, WalletAddress};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("not valid base58: {0}")]
    Base58(String),

    #[error("expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },
}

fn decode_fixed<const N: usize>(text: &str) -> Result<[u8; N], CodecError> {
    let bytes = bs58::decode(text.trim())
        .into_vec()
        .map_err(|e| CodecError::Base58(e.to_string()))?;
    let actual = bytes.len();
    bytes
        .try_into()
        .map_err(|_| CodecError::Length { expected: N, actual })
}

/// Extract the public key from a wallet address.
pub fn decode_address(address: &WalletAddress) -> Result<PublicKey, CodecError> {
    decode_fixed::<32>(address.as_str()).map(PublicKey)
}

/// Render a public key as its wallet address.
pub fn encode_address(public_key: &PublicKey) -> WalletAddress {
    WalletAddress::new(bs58::encode(public_key.as_bytes()).into_string())
}

/// Decode a base58 signature.
pub fn decode_signature(text: &str) -> Result<Signature, CodecError> {
    decode_fixed::<64>(text).map(Signature)
}

/// Render a signature as base58.
pub fn encode_signature(signature: &Signature) -> String {
    bs58::encode(signature.as_bytes()).into_string()
}
