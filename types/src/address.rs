//! Wallet address type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeError;

/// Base58 alphabet (Bitcoin ordering, no `0`, `O`, `I`, `l`).
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// A wallet address: the base58 text form of a 32-byte Ed25519 public key.
///
/// The address *is* the voter's public key. Decoding to key bytes lives in
/// `squad_crypto::decode_address`; this type only guarantees the textual shape.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Shortest base58 rendering of 32 bytes.
    pub const MIN_LEN: usize = 32;
    /// Longest base58 rendering of 32 bytes.
    pub const MAX_LEN: usize = 44;

    /// Wrap a raw address string without validation.
    ///
    /// Use for values read back from trusted storage; request input should go
    /// through [`WalletAddress::parse`].
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Parse an address, checking length and base58 alphabet.
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let s = raw.trim();
        if s.len() < Self::MIN_LEN || s.len() > Self::MAX_LEN {
            return Err(TypeError::InvalidAddress(format!(
                "length {} outside {}..={}",
                s.len(),
                Self::MIN_LEN,
                Self::MAX_LEN
            )));
        }
        if let Some(c) = s.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
            return Err(TypeError::InvalidAddress(format!(
                "character {c:?} is not base58"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
