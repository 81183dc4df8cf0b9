//! Tunable governance parameters.

use serde::{Deserialize, Serialize};

fn default_min_points_to_vote() -> u64 {
    500
}

fn default_broadcast_threshold() -> u64 {
    1000
}

fn default_message_max_age_secs() -> u64 {
    300
}

/// Thresholds applied by the voting engine.
///
/// Deserializes from the `[governance]` table of the node config; every
/// field has a default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    /// Minimum reputation a voter needs to cast a vote.
    #[serde(default = "default_min_points_to_vote")]
    pub min_points_to_vote: u64,

    /// Up-weight at which a proposal is broadcast.
    #[serde(default = "default_broadcast_threshold")]
    pub broadcast_threshold: u64,

    /// Maximum age (and future skew) of a signed message. `0` disables the check.
    #[serde(default = "default_message_max_age_secs")]
    pub message_max_age_secs: u64,

    /// Net weight a proposal must exceed to succeed under [`crate::NetWeightPolicy`].
    #[serde(default)]
    pub pass_threshold: i64,
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            min_points_to_vote: default_min_points_to_vote(),
            broadcast_threshold: default_broadcast_threshold(),
            message_max_age_secs: default_message_max_age_secs(),
            pass_threshold: 0,
        }
    }
}
