//! HTTP client for the voter and squad directory service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use squad_types::{SquadId, WalletAddress};

use crate::traits::{SquadDirectory, VoterDirectory};
use crate::{DirectoryError, Squad, Voter};

/// Default timeout for directory requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Directory backed by an HTTP service.
///
/// - `GET {base}/squads/{id}` returns a [`Squad`], or 404.
/// - `PUT {base}/voters/{wallet}` returns the existing [`Voter`] or creates
///   one with the service's default reputation.
#[derive(Clone)]
pub struct HttpDirectory {
    base_url: String,
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
}

impl HttpDirectory {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Map a directory response to `T`, turning 404 into `NotFound(what)`.
async fn parse_response<T: DeserializeOwned>(
    response: reqwest::Response,
    what: String,
) -> Result<T, DirectoryError> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(DirectoryError::NotFound(what)),
        status if !status.is_success() => {
            Err(DirectoryError::RequestFailed(format!("HTTP status {status}")))
        }
        _ => response.json().await.map_err(|e| {
            DirectoryError::InvalidResponse(format!("failed to parse {what}: {e}"))
        }),
    }
}

#[async_trait]
impl VoterDirectory for HttpDirectory {
    async fn get_or_create_voter(&self, wallet: &WalletAddress) -> Result<Voter, DirectoryError> {
        let url = format!("{}/voters/{}", self.base_url, wallet);
        debug!(%url, "voter lookup");
        let response = self.http_client.put(&url).send().await?;
        let voter: Voter = parse_response(response, format!("voter {wallet}")).await?;
        if &voter.wallet != wallet {
            return Err(DirectoryError::InvalidResponse(format!(
                "asked for voter {wallet}, got {}",
                voter.wallet
            )));
        }
        Ok(voter)
    }
}

#[async_trait]
impl SquadDirectory for HttpDirectory {
    async fn get_squad(&self, id: &SquadId) -> Result<Squad, DirectoryError> {
        let url = format!("{}/squads/{}", self.base_url, id);
        debug!(%url, "squad lookup");
        let response = self.http_client.get(&url).send().await?;
        parse_response(response, format!("squad {id}")).await
    }
}
