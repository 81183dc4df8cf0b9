//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use squad_governance::GovernanceParams;

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a squad voting node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub lmdb_map_size: usize,

    /// Address the HTTP API binds to.
    #[serde(default = "default_rpc_host")]
    pub rpc_host: IpAddr,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Base URL of the voter and squad directory service.
    #[serde(default = "default_directory_url")]
    pub directory_url: String,

    /// Per-request timeout for directory lookups, in seconds.
    #[serde(default = "default_directory_timeout_secs")]
    pub directory_timeout_secs: u64,

    /// Webhook that receives notification events. Events are only logged
    /// when unset.
    #[serde(default)]
    pub notify_webhook_url: Option<String>,

    /// Bearer token the external scheduler presents to the register,
    /// activate, finalize and recompute hooks. The hooks are disabled when
    /// unset.
    #[serde(default)]
    pub scheduler_token: Option<String>,

    /// How often ended proposals are finalized, in seconds. 0 disables the
    /// sweep and leaves finalization to the scheduler hooks.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    #[serde(default = "default_log_format")]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Voting parameters, the `[governance]` table.
    #[serde(default)]
    pub governance: GovernanceParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./squad_data")
}

fn default_map_size() -> usize {
    1 << 30
}

fn default_rpc_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_rpc_port() -> u16 {
    7080
}

fn default_directory_url() -> String {
    "http://127.0.0.1:3000/api".to_string()
}

fn default_directory_timeout_secs() -> u64 {
    5
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NodeError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn rpc_addr(&self) -> SocketAddr {
        SocketAddr::new(self.rpc_host, self.rpc_port)
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        if self.lmdb_map_size == 0 {
            return Err(NodeError::Config("lmdb_map_size must be positive".into()));
        }
        if self.directory_url.trim().is_empty() {
            return Err(NodeError::Config("directory_url is empty".into()));
        }
        if matches!(&self.scheduler_token, Some(t) if t.trim().is_empty()) {
            return Err(NodeError::Config("scheduler_token is empty".into()));
        }
        if self.governance.broadcast_threshold == 0 {
            return Err(NodeError::Config(
                "governance.broadcast_threshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            lmdb_map_size: default_map_size(),
            rpc_host: default_rpc_host(),
            rpc_port: default_rpc_port(),
            directory_url: default_directory_url(),
            directory_timeout_secs: default_directory_timeout_secs(),
            notify_webhook_url: None,
            scheduler_token: None,
            sweep_interval_secs: default_sweep_interval_secs(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            governance: GovernanceParams::default(),
        }
    }
}
