//! External collaborators of the voting engine.
//!
//! - The voter directory owns reputation points and provisions unknown
//!   wallets on first contact.
//! - The squad directory resolves squad membership.
//! - The notification sink receives broadcast and close events,
//!   fire-and-forget.
//!
//! The engine only sees the traits in [`traits`]. [`HttpDirectory`] and
//! [`WebhookNotifier`] talk to a directory service over HTTP.

pub mod client;
pub mod error;
pub mod notify;
pub mod traits;
pub mod types;

pub use client::HttpDirectory;
pub use error::DirectoryError;
pub use notify::{LogNotifier, WebhookNotifier};
pub use traits::{NotificationSink, SquadDirectory, VoterDirectory};
pub use types::{NotificationEvent, Squad, Voter};
