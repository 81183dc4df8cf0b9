//! Wallet authentication of signed vote and cancel messages.

use std::sync::Arc;

use squad_crypto::{decode_address, decode_signature, SignatureVerifier};
use squad_types::{Timestamp, VoteChoice, WalletAddress};
use tracing::debug;

use crate::message::{check_freshness, CancelMessage, VoteMessage};
use crate::GovernanceError;

/// Validates signed messages, then checks the signature against the
/// wallet named in the message.
#[derive(Clone)]
pub struct Authenticator {
    verifier: Arc<dyn SignatureVerifier>,
    max_age_secs: u64,
}

impl Authenticator {
    pub fn new(verifier: Arc<dyn SignatureVerifier>, max_age_secs: u64) -> Self {
        Self {
            verifier,
            max_age_secs,
        }
    }

    /// Authenticate a vote on `reference` for `choice`; returns the parsed message.
    pub fn authenticate_vote(
        &self,
        reference: &str,
        choice: VoteChoice,
        signature: &str,
        message: &str,
        now: Timestamp,
    ) -> Result<VoteMessage, GovernanceError> {
        let parsed = VoteMessage::parse(message)?;
        parsed.ensure_matches(reference, choice)?;
        check_freshness(parsed.issued_at_ms, now, self.max_age_secs)?;
        self.verify(message, signature, &parsed.voter)?;
        Ok(parsed)
    }

    /// Authenticate a cancel request on `reference`; returns the parsed message.
    pub fn authenticate_cancel(
        &self,
        reference: &str,
        signature: &str,
        message: &str,
        now: Timestamp,
    ) -> Result<CancelMessage, GovernanceError> {
        let parsed = CancelMessage::parse(message)?;
        parsed.ensure_matches(reference)?;
        check_freshness(parsed.issued_at_ms, now, self.max_age_secs)?;
        self.verify(message, signature, &parsed.leader)?;
        Ok(parsed)
    }

    fn verify(
        &self,
        message: &str,
        signature: &str,
        wallet: &WalletAddress,
    ) -> Result<(), GovernanceError> {
        let public_key = decode_address(wallet).map_err(|e| {
            debug!(%wallet, error = %e, "wallet is not a public key");
            GovernanceError::InvalidSignature
        })?;
        let signature = decode_signature(signature).map_err(|e| {
            debug!(%wallet, error = %e, "undecodable signature");
            GovernanceError::InvalidSignature
        })?;
        if !self
            .verifier
            .verify(message.as_bytes(), &signature, &public_key)
        {
            debug!(%wallet, "signature mismatch");
            return Err(GovernanceError::InvalidSignature);
        }
        Ok(())
    }
}
