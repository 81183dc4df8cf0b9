//! Squad voting node.
//!
//! The node is the process-level coordinator that:
//! - Loads configuration and initialises logging
//! - Opens the LMDB environment
//! - Wires the vote engine to the directory service and notification sink
//! - Serves the HTTP API and Prometheus metrics
//! - Periodically finalizes proposals whose voting window has ended

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;
pub mod shutdown;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::{Collaborators, SquadNode};
pub use shutdown::ShutdownController;
