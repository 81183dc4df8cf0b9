//! HttpDirectory against a local stub of the directory service.

use std::net::SocketAddr;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use squad_directory::{DirectoryError, HttpDirectory, SquadDirectory, VoterDirectory};
use squad_types::{SquadId, WalletAddress};

async fn squad(Path(id): Path<String>) -> impl IntoResponse {
    if id == "s1" {
        Json(serde_json::json!({
            "id": "s1",
            "leader_wallet": "LeaderWallet",
            "member_wallets": ["LeaderWallet", "MemberWallet"],
        }))
        .into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

async fn voter(Path(wallet): Path<String>) -> impl IntoResponse {
    let body = if wallet == "KnownWallet" {
        serde_json::json!({"user_id": "u-7", "wallet": wallet, "points": 1200})
    } else {
        serde_json::json!({"user_id": null, "wallet": wallet, "points": 500})
    };
    Json(body)
}

async fn spawn_stub() -> SocketAddr {
    let app = Router::new()
        .route("/squads/:id", get(squad))
        .route("/voters/:wallet", put(voter));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn resolves_squad_membership() {
    let addr = spawn_stub().await;
    let dir = HttpDirectory::new(&format!("http://{addr}/"));

    let squad = dir.get_squad(&SquadId::new("s1")).await.unwrap();
    assert_eq!(squad.leader_wallet.as_str(), "LeaderWallet");
    assert!(squad.is_member(&WalletAddress::new("MemberWallet")));
    assert!(!squad.is_member(&WalletAddress::new("Outsider")));
}

#[tokio::test]
async fn unknown_squad_is_not_found() {
    let addr = spawn_stub().await;
    let dir = HttpDirectory::new(&format!("http://{addr}"));

    let err = dir.get_squad(&SquadId::new("missing")).await.unwrap_err();
    assert!(matches!(err, DirectoryError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn voters_are_provisioned_with_default_points() {
    let addr = spawn_stub().await;
    let dir = HttpDirectory::new(&format!("http://{addr}"));

    let known = dir
        .get_or_create_voter(&WalletAddress::new("KnownWallet"))
        .await
        .unwrap();
    assert_eq!(known.points, 1200);
    assert_eq!(known.user_id.as_deref(), Some("u-7"));

    let fresh = dir
        .get_or_create_voter(&WalletAddress::new("FreshWallet"))
        .await
        .unwrap();
    assert_eq!(fresh.points, 500);
    assert!(fresh.user_id.is_none());
}
