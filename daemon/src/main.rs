//! Squad voting daemon: entry point for running a node.

use anyhow::Context;
use clap::Parser;
use squad_node::{init_logging, LogFormat, NodeConfig, SquadNode};
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "squad-daemon", about = "Squad proposal voting daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "SQUAD_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB environment.
    #[arg(long, env = "SQUAD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Address the HTTP API binds to.
    #[arg(long, env = "SQUAD_RPC_HOST")]
    rpc_host: Option<IpAddr>,

    #[arg(long, env = "SQUAD_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Base URL of the voter and squad directory service.
    #[arg(long, env = "SQUAD_DIRECTORY_URL")]
    directory_url: Option<String>,

    /// Webhook that receives broadcast and close events.
    #[arg(long, env = "SQUAD_NOTIFY_WEBHOOK_URL")]
    notify_webhook_url: Option<String>,

    /// Bearer token required by the scheduler hooks (disabled when unset).
    #[arg(long, env = "SQUAD_SCHEDULER_TOKEN", hide_env_values = true)]
    scheduler_token: Option<String>,

    /// Seconds between sweeps of ended proposals (0 disables).
    #[arg(long, env = "SQUAD_SWEEP_INTERVAL_SECS")]
    sweep_interval_secs: Option<u64>,

    #[arg(long, env = "SQUAD_MIN_POINTS_TO_VOTE")]
    min_points_to_vote: Option<u64>,

    #[arg(long, env = "SQUAD_BROADCAST_THRESHOLD")]
    broadcast_threshold: Option<u64>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SQUAD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SQUAD_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Cli {
    /// Overlay flags and env vars on top of `base`.
    fn apply(self, mut config: NodeConfig) -> NodeConfig {
        if let Some(v) = self.data_dir {
            config.data_dir = v;
        }
        if let Some(v) = self.rpc_host {
            config.rpc_host = v;
        }
        if let Some(v) = self.rpc_port {
            config.rpc_port = v;
        }
        if let Some(v) = self.directory_url {
            config.directory_url = v;
        }
        if self.notify_webhook_url.is_some() {
            config.notify_webhook_url = self.notify_webhook_url;
        }
        if self.scheduler_token.is_some() {
            config.scheduler_token = self.scheduler_token;
        }
        if let Some(v) = self.sweep_interval_secs {
            config.sweep_interval_secs = v;
        }
        if let Some(v) = self.min_points_to_vote {
            config.governance.min_points_to_vote = v;
        }
        if let Some(v) = self.broadcast_threshold {
            config.governance.broadcast_threshold = v;
        }
        if let Some(v) = self.log_format {
            config.log_format = v;
        }
        if let Some(v) = self.log_level {
            config.log_level = v;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    let base = match cli.config.take() {
        Some(path) => NodeConfig::from_toml_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    let config = cli.apply(base);
    config.validate().context("invalid configuration")?;

    init_logging(config.log_format, &config.log_level)?;
    tracing::info!(
        rpc = %config.rpc_addr(),
        data_dir = %config.data_dir.display(),
        "starting squad daemon"
    );

    let mut node = SquadNode::new(config).context("initialising node")?;
    node.start().await?;

    node.shutdown.wait_for_signal().await;
    tracing::info!("shutdown signal received, stopping node");
    node.stop().await?;

    tracing::info!("squad daemon exited cleanly");
    Ok(())
}
