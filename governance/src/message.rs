//! Signed message formats.
//!
//! Wallets sign a pipe-separated, tagged string. It is parsed and checked
//! against the request before any signature work is done.
//!
//! - vote: `squad-vote|<proposal>|<choice>|<voter_wallet>|<issued_at_ms>`
//! - cancel: `squad-cancel|<proposal>|<leader_wallet>|<issued_at_ms>`
//!
//! `<proposal>` is the reference (id or slug) the request addresses, and
//! `<issued_at_ms>` is the client's clock in Unix milliseconds.

use squad_types::{Timestamp, VoteChoice, WalletAddress};

use crate::GovernanceError;

pub const VOTE_TAG: &str = "squad-vote";
pub const CANCEL_TAG: &str = "squad-cancel";

const SEPARATOR: char = '|';

/// Upper bound on a signed message, far above any valid one.
const MAX_MESSAGE_LEN: usize = 512;

/// Parsed vote message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteMessage {
    pub proposal: String,
    pub choice: VoteChoice,
    pub voter: WalletAddress,
    pub issued_at_ms: u64,
}

/// Parsed cancel message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CancelMessage {
    pub proposal: String,
    pub leader: WalletAddress,
    pub issued_at_ms: u64,
}

fn malformed(reason: impl Into<String>) -> GovernanceError {
    GovernanceError::MalformedMessage(reason.into())
}

/// Split `raw` into exactly `N` fields after checking the leading tag.
fn fields<'a, const N: usize>(raw: &'a str, tag: &str) -> Result<[&'a str; N], GovernanceError> {
    if raw.len() > MAX_MESSAGE_LEN {
        return Err(malformed("message too long"));
    }
    let mut parts = raw.split(SEPARATOR);
    match parts.next() {
        Some(t) if t == tag => {}
        _ => return Err(malformed(format!("expected tag {tag:?}"))),
    }
    let mut out = [""; N];
    for slot in out.iter_mut() {
        *slot = parts
            .next()
            .ok_or_else(|| malformed(format!("expected {} fields", N + 1)))?;
    }
    if parts.next().is_some() {
        return Err(malformed(format!("expected {} fields", N + 1)));
    }
    if out.iter().any(|f| f.is_empty()) {
        return Err(malformed("empty field"));
    }
    Ok(out)
}

fn parse_issued_at(raw: &str) -> Result<u64, GovernanceError> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed("timestamp is not a number"));
    }
    raw.parse()
        .map_err(|_| malformed("timestamp out of range"))
}

fn parse_wallet(raw: &str) -> Result<WalletAddress, GovernanceError> {
    WalletAddress::parse(raw).map_err(|e| malformed(e.to_string()))
}

impl VoteMessage {
    pub fn parse(raw: &str) -> Result<Self, GovernanceError> {
        let [proposal, choice, voter, issued_at] = fields::<4>(raw, VOTE_TAG)?;
        Ok(Self {
            proposal: proposal.to_string(),
            choice: choice
                .parse()
                .map_err(|_| malformed(format!("unknown choice {choice:?}")))?,
            voter: parse_wallet(voter)?,
            issued_at_ms: parse_issued_at(issued_at)?,
        })
    }

    pub fn encode(&self) -> String {
        format!(
            "{VOTE_TAG}|{}|{}|{}|{}",
            self.proposal, self.choice, self.voter, self.issued_at_ms
        )
    }

    /// Reject a message signed for another proposal or choice.
    pub fn ensure_matches(&self, reference: &str, choice: VoteChoice) -> Result<(), GovernanceError> {
        if self.proposal != reference {
            return Err(malformed("message is for a different proposal"));
        }
        if self.choice != choice {
            return Err(malformed("message choice does not match the request"));
        }
        Ok(())
    }
}

impl CancelMessage {
    pub fn parse(raw: &str) -> Result<Self, GovernanceError> {
        let [proposal, leader, issued_at] = fields::<3>(raw, CANCEL_TAG)?;
        Ok(Self {
            proposal: proposal.to_string(),
            leader: parse_wallet(leader)?,
            issued_at_ms: parse_issued_at(issued_at)?,
        })
    }

    pub fn encode(&self) -> String {
        format!(
            "{CANCEL_TAG}|{}|{}|{}",
            self.proposal, self.leader, self.issued_at_ms
        )
    }

    pub fn ensure_matches(&self, reference: &str) -> Result<(), GovernanceError> {
        if self.proposal != reference {
            return Err(malformed("message is for a different proposal"));
        }
        Ok(())
    }
}

/// Check that a message issued at `issued_at_ms` is within `max_age_secs` of
/// `now`, in either direction. `max_age_secs == 0` disables the check.
pub fn check_freshness(
    issued_at_ms: u64,
    now: Timestamp,
    max_age_secs: u64,
) -> Result<(), GovernanceError> {
    if max_age_secs == 0 {
        return Ok(());
    }
    let age_secs = Timestamp::from_millis(issued_at_ms).abs_diff(now);
    if age_secs > max_age_secs {
        return Err(GovernanceError::MessageExpired {
            age_secs,
            max_age_secs,
        });
    }
    Ok(())
}
