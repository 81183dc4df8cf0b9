//! Node start/stop, the HTTP listener and the sweep over real LMDB.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use squad_node::{Collaborators, NodeConfig, NodeError, SquadNode};
use squad_nullables::{NullNotifier, NullSquadDirectory, NullVoterDirectory};
use squad_types::{Proposal, ProposalId, ProposalStatus, SquadId, Tally, Timestamp, WalletAddress};

fn config(dir: &Path) -> NodeConfig {
    NodeConfig {
        data_dir: dir.to_path_buf(),
        lmdb_map_size: 16 * 1024 * 1024,
        rpc_host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        rpc_port: 0,
        sweep_interval_secs: 0,
        ..NodeConfig::default()
    }
}

fn collaborators() -> Collaborators {
    Collaborators {
        voters: Arc::new(NullVoterDirectory::new()),
        squads: Arc::new(NullSquadDirectory::new()),
        notifier: Arc::new(NullNotifier::new()),
    }
}

fn ended_proposal(id: &str) -> Proposal {
    Proposal {
        id: ProposalId::new(id),
        squad_id: SquadId::new("squad-1"),
        slug: format!("{id}-slug"),
        title: "Paint the clubhouse".to_string(),
        leader_wallet: WalletAddress::new("8qbHbw2BbbTHBW1sbeqakYXVKRQM8Ne7pLK7m6CVfeR"),
        status: ProposalStatus::Active,
        broadcasted: false,
        epoch_start: Timestamp::new(1),
        epoch_end: Timestamp::new(2),
        tally: Tally::default(),
        created_at: Timestamp::new(1),
    }
}

async fn http_get(addr: std::net::SocketAddr, path: &str) -> String {
    let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    http_raw(addr, &request).await
}

async fn http_post(addr: std::net::SocketAddr, path: &str, extra_headers: &str, body: &str) -> String {
    let request = format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n{extra_headers}Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );
    http_raw(addr, &request).await
}

async fn http_raw(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn test_start_serves_health_and_metrics() {
    let dir = tempfile::tempdir().unwrap();
    let mut node = SquadNode::with_collaborators(config(dir.path()), collaborators()).unwrap();
    node.start().await.unwrap();
    let addr = node.rpc_addr().unwrap();
    assert_ne!(addr.port(), 0);

    let health = http_get(addr, "/health").await;
    assert!(health.starts_with("HTTP/1.1 200"), "{health}");
    assert!(health.contains("\"ok\""));

    let metrics = http_get(addr, "/metrics").await;
    assert!(metrics.contains("squad_sweeps_total"));
    assert!(metrics.contains("squad_votes_cast_total"));

    assert!(matches!(node.start().await, Err(NodeError::AlreadyStarted)));
    node.stop().await.unwrap();
    assert!(node.rpc_addr().is_none());
}

#[tokio::test]
async fn test_scheduler_hooks_need_the_configured_token() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.scheduler_token = Some("node-secret".to_string());
    let mut node = SquadNode::with_collaborators(cfg, collaborators()).unwrap();
    node.engine().register(ended_proposal("p-1")).unwrap();
    node.start().await.unwrap();
    let addr = node.rpc_addr().unwrap();

    let outcome = r#"{"outcome":"failed"}"#;
    let anonymous = http_post(addr, "/proposals/p-1/finalize", "", outcome).await;
    assert!(anonymous.starts_with("HTTP/1.1 401"), "{anonymous}");
    assert_eq!(
        node.engine().get_proposal("p-1").unwrap().status,
        ProposalStatus::Active
    );

    let auth = "Authorization: Bearer node-secret\r\n";
    let scheduled = http_post(addr, "/proposals/p-1/finalize", auth, outcome).await;
    assert!(scheduled.starts_with("HTTP/1.1 200"), "{scheduled}");
    assert_eq!(
        node.engine().get_proposal("p-1").unwrap().status,
        ProposalStatus::Failed
    );
    node.stop().await.unwrap();
}

#[tokio::test]
async fn test_sweep_finalizes_and_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let node = SquadNode::with_collaborators(config(dir.path()), collaborators()).unwrap();
        node.engine().register(ended_proposal("old-1")).unwrap();
        assert_eq!(node.sweep_once(), 1);
        assert_eq!(node.sweep_once(), 0);
        assert_eq!(node.metrics().proposals_finalized.get(), 1);
        assert_eq!(node.metrics().sweeps.get(), 2);
    }

    let node = SquadNode::with_collaborators(config(dir.path()), collaborators()).unwrap();
    let p = node.engine().get_proposal("old-1-slug").unwrap();
    assert_eq!(p.status, ProposalStatus::Failed);
}

#[test]
fn test_invalid_config_is_rejected_before_opening_storage() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(&dir.path().join("never-created"));
    cfg.governance.broadcast_threshold = 0;
    assert!(matches!(
        SquadNode::with_collaborators(cfg, collaborators()),
        Err(NodeError::Config(_))
    ));
    assert!(!dir.path().join("never-created").exists());
}
