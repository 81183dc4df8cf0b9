//! Opaque identifiers for proposals, squads and votes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypeError;

/// Upper bound on identifier length (ids and slugs alike).
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Check that `raw` can be used as an identifier.
///
/// Identifiers are embedded in signed messages and storage keys, so they must be
/// non-empty, bounded, and free of whitespace, control characters and the `|`
/// field separator.
pub fn validate_identifier(raw: &str) -> Result<(), TypeError> {
    if raw.is_empty() {
        return Err(TypeError::InvalidIdentifier("empty".into()));
    }
    if raw.len() > MAX_IDENTIFIER_LEN {
        return Err(TypeError::InvalidIdentifier(format!(
            "longer than {MAX_IDENTIFIER_LEN} bytes"
        )));
    }
    if raw
        .chars()
        .any(|c| c == '|' || c.is_whitespace() || c.is_control())
    {
        return Err(TypeError::InvalidIdentifier(format!(
            "{raw:?} contains a reserved character"
        )));
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier without validation.
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Parse an identifier from request input.
            pub fn parse(raw: &str) -> Result<Self, TypeError> {
                validate_identifier(raw)?;
                Ok(Self(raw.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Primary key of a proposal.
    ProposalId
);
string_id!(
    /// Identifier of the squad that owns a proposal.
    SquadId
);
string_id!(
    /// Identifier of a cast vote (derived from the proposal and voter).
    VoteId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_object_id_and_slug() {
        assert!(ProposalId::parse("665f1c2a9b3e4d0012345678").is_ok());
        assert!(ProposalId::parse("bonk-airdrop-2024").is_ok());
    }

    #[test]
    fn rejects_separator_and_whitespace() {
        assert!(ProposalId::parse("a|b").is_err());
        assert!(ProposalId::parse("a b").is_err());
        assert!(ProposalId::parse("").is_err());
        assert!(ProposalId::parse(&"x".repeat(MAX_IDENTIFIER_LEN + 1)).is_err());
    }
}
