//! The node: opens storage, wires the vote engine to its collaborators and
//! runs the HTTP API and the sweep of ended proposals.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use squad_crypto::Ed25519Verifier;
use squad_directory::{
    HttpDirectory, LogNotifier, NotificationSink, SquadDirectory, VoterDirectory, WebhookNotifier,
};
use squad_governance::{NetWeightPolicy, VoteEngine};
use squad_rpc::RpcState;
use squad_store_lmdb::LmdbEnvironment;
use squad_types::SystemClock;

use crate::config::NodeConfig;
use crate::error::NodeError;
use crate::metrics::NodeMetrics;
use crate::shutdown::ShutdownController;

/// Timeout for waiting on background tasks during shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// External services the engine talks to.
pub struct Collaborators {
    pub voters: Arc<dyn VoterDirectory>,
    pub squads: Arc<dyn SquadDirectory>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl Collaborators {
    /// HTTP directory plus webhook (or log-only) notifications, as configured.
    pub fn from_config(config: &NodeConfig) -> Self {
        let directory = Arc::new(HttpDirectory::with_timeout(
            &config.directory_url,
            Duration::from_secs(config.directory_timeout_secs),
        ));
        let notifier: Arc<dyn NotificationSink> = match &config.notify_webhook_url {
            Some(url) => Arc::new(WebhookNotifier::new(url)),
            None => Arc::new(LogNotifier),
        };
        Self {
            voters: directory.clone(),
            squads: directory,
            notifier,
        }
    }
}

pub struct SquadNode {
    config: NodeConfig,
    env: LmdbEnvironment,
    engine: Arc<VoteEngine>,
    metrics: Arc<NodeMetrics>,
    rpc_state: RpcState,
    pub shutdown: ShutdownController,
    rpc_addr: Option<SocketAddr>,
    /// Handles for spawned background tasks (joined during shutdown).
    task_handles: Vec<JoinHandle<()>>,
}

impl SquadNode {
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let collaborators = Collaborators::from_config(&config);
        Self::with_collaborators(config, collaborators)
    }

    pub fn with_collaborators(
        config: NodeConfig,
        collaborators: Collaborators,
    ) -> Result<Self, NodeError> {
        config.validate()?;
        let env = LmdbEnvironment::open(&config.data_dir, config.lmdb_map_size)?;
        let report = env.check_integrity()?;
        if !report.is_healthy() {
            warn!(errors = ?report.errors, "LMDB integrity check reported errors");
        }

        let engine = Arc::new(VoteEngine::new(
            Arc::new(env.governance_store()),
            collaborators.voters,
            collaborators.squads,
            collaborators.notifier,
            Arc::new(Ed25519Verifier),
            Arc::new(SystemClock),
            config.governance.clone(),
        ));
        let metrics = Arc::new(NodeMetrics::new()?);
        let rpc_state = RpcState::new(Arc::clone(&engine), metrics.registry.clone())?
            .with_scheduler_token(config.scheduler_token.clone());
        if config.scheduler_token.is_none() {
            info!("no scheduler_token configured, scheduler hooks are disabled");
        }

        Ok(Self {
            config,
            env,
            engine,
            metrics,
            rpc_state,
            shutdown: ShutdownController::new(),
            rpc_addr: None,
            task_handles: Vec::new(),
        })
    }

    pub fn engine(&self) -> &Arc<VoteEngine> {
        &self.engine
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    /// Address the HTTP API is bound to, once started.
    pub fn rpc_addr(&self) -> Option<SocketAddr> {
        self.rpc_addr
    }

    /// Bind the HTTP API and spawn the background tasks.
    pub async fn start(&mut self) -> Result<(), NodeError> {
        if self.rpc_addr.is_some() {
            return Err(NodeError::AlreadyStarted);
        }
        info!(
            data_dir = %self.config.data_dir.display(),
            directory = %self.config.directory_url,
            broadcast_threshold = self.config.governance.broadcast_threshold,
            min_points_to_vote = self.config.governance.min_points_to_vote,
            "squad node starting"
        );

        let listener = TcpListener::bind(self.config.rpc_addr()).await?;
        self.rpc_addr = Some(listener.local_addr()?);
        let state = self.rpc_state.clone();
        let stop = self.shutdown.signalled();
        self.task_handles.push(tokio::spawn(async move {
            if let Err(e) = squad_rpc::serve(listener, state, stop).await {
                error!(error = %e, "RPC server failed");
            }
        }));

        if self.config.sweep_interval_secs > 0 {
            self.spawn_sweep(Duration::from_secs(self.config.sweep_interval_secs));
        }
        Ok(())
    }

    // ── Sweep task: finalizes proposals whose voting window has ended ──
    fn spawn_sweep(&mut self, every: Duration) {
        let engine = Arc::clone(&self.engine);
        let metrics = Arc::clone(&self.metrics);
        let policy = NetWeightPolicy {
            pass_threshold: self.config.governance.pass_threshold,
        };
        let mut shutdown_rx = self.shutdown.subscribe();

        self.task_handles.push(tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        info!("sweep task shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let engine = Arc::clone(&engine);
                        let metrics = Arc::clone(&metrics);
                        let swept = tokio::task::spawn_blocking(move || {
                            sweep(&engine, &metrics, &policy)
                        })
                        .await;
                        if let Err(e) = swept {
                            error!(error = %e, "sweep task panicked");
                        }
                    }
                }
            }
        }));
    }

    /// Run one sweep now. Returns how many proposals were finalized.
    pub fn sweep_once(&self) -> usize {
        let policy = NetWeightPolicy {
            pass_threshold: self.config.governance.pass_threshold,
        };
        sweep(&self.engine, &self.metrics, &policy)
    }

    /// Signal every task, wait for them and flush storage.
    pub async fn stop(&mut self) -> Result<(), NodeError> {
        info!("squad node stopping");
        self.shutdown.shutdown();

        let handles: Vec<JoinHandle<()>> = self.task_handles.drain(..).collect();
        let wait_all = async {
            for handle in handles {
                let _ = handle.await;
            }
        };
        if tokio::time::timeout(SHUTDOWN_TIMEOUT, wait_all).await.is_err() {
            warn!(
                "shutdown timeout ({:?}), some tasks may still be running",
                SHUTDOWN_TIMEOUT
            );
        }

        self.env.force_sync()?;
        self.rpc_addr = None;
        info!("squad node stopped");
        Ok(())
    }
}

fn sweep(engine: &VoteEngine, metrics: &NodeMetrics, policy: &NetWeightPolicy) -> usize {
    let started = Instant::now();
    match engine.sweep_ended(policy) {
        Ok(closed) => {
            metrics.sweeps.inc();
            metrics.proposals_finalized.inc_by(closed.len() as u64);
            metrics
                .sweep_duration_ms
                .observe(started.elapsed().as_secs_f64() * 1000.0);
            if !closed.is_empty() {
                info!(finalized = closed.len(), "sweep finalized ended proposals");
            }
            closed.len()
        }
        Err(e) => {
            metrics.sweep_failures.inc();
            warn!(error = %e, "sweep failed");
            0
        }
    }
}
