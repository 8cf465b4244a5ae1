//! Ethos reputation API client
//!
//! Thin typed wrapper over the Ethos network API. Two operating modes:
//!
//! - Score-only lookup (`lookup_score`): one GET per address, used by the
//!   batch pipeline. Never returns an error to its caller; every failure
//!   mode is contained into `ScoreOutcome::Failure`.
//! - Full-profile lookup (`fetch_profile`): used for single-address manual
//!   search. Profile resolution is mandatory (a missing profile is
//!   `Error::NotFound`); the three secondary enrichments are each allowed
//!   to fail independently.
//!
//! Every outgoing request carries the `X-Ethos-Client` header. Outbound
//! sockets can be pinned to IPv4 — the service hostname resolves
//! unreliably over IPv6 in some environments.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracing::{debug, warn};
use trust_common::{Error, TrustConfig};

use crate::models::{LevelCategory, UserProfile};

/// Outcome of a score-only lookup
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreOutcome {
    /// The service returned a well-formed score payload
    Success { score: i64, level: LevelCategory },
    /// Transport error, non-2xx status, or malformed payload
    Failure { reason: String },
}

/// Score-lookup seam used by the batch orchestrator.
///
/// Abstracted as a trait so the pipeline can be driven by a scripted
/// fake in tests.
#[async_trait]
pub trait ScoreLookup: Send + Sync {
    /// Resolve one address to a score outcome. Must not panic or error;
    /// all failure modes are contained in the returned outcome.
    async fn lookup_score(&self, address: &str) -> ScoreOutcome;
}

// ============================================================================
// Wire types
// ============================================================================

/// GET /api/v2/score/address response
#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: Option<i64>,
    level: Option<String>,
}

/// GET /api/v1/addresses/address:{addr} response envelope
#[derive(Debug, Deserialize)]
struct AddressEnvelope {
    data: AddressRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddressRecord {
    profile_id: Option<i64>,
    primary_address: Option<String>,
    all_addresses: Option<Vec<String>>,
}

/// GET /api/v1/users/profileId:{id}/stats response envelope
#[derive(Debug, Deserialize)]
struct StatsEnvelope {
    data: serde_json::Value,
}

// ============================================================================
// Client
// ============================================================================

/// Ethos API client
pub struct EthosClient {
    http_client: Client,
    api_base: String,
}

impl EthosClient {
    /// Build a client from service configuration.
    ///
    /// Sets the fixed client-identifier header, the per-request timeout,
    /// and (when configured) pins outbound sockets to IPv4.
    pub fn new(config: &TrustConfig) -> Result<Self, Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::HeaderName::from_static("x-ethos-client"),
            header::HeaderValue::from_str(&config.client_id)
                .map_err(|e| Error::Config(format!("Invalid client_id header value: {}", e)))?,
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs));

        if config.force_ipv4 {
            builder = builder.local_address(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        }

        let http_client = builder
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch score and level for an address.
    ///
    /// Errors on transport failure, non-2xx status, or a payload missing
    /// the `score`/`level` fields.
    async fn fetch_score(&self, address: &str) -> Result<(i64, LevelCategory), Error> {
        let url = format!("{}/api/v2/score/address", self.api_base);

        debug!(address = %address, "Querying Ethos score");

        let response = self
            .http_client
            .get(&url)
            .query(&[("address", address)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload: ScoreResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("score payload: {}", e)))?;

        score_from_response(payload)
    }

    /// Resolve an address to its Ethos profile record.
    ///
    /// A 404 from the service or an envelope without a `profileId` both
    /// mean the address has no profile.
    async fn resolve_address(&self, address: &str) -> Result<AddressRecord, Error> {
        let url = format!("{}/api/v1/addresses/address:{}", self.api_base, address);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(address.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: AddressEnvelope = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("address payload: {}", e)))?;

        Ok(envelope.data)
    }

    /// Fetch profile attributes by profile handle
    async fn fetch_user(&self, profile_id: i64) -> Result<serde_json::Value, Error> {
        let url = format!("{}/api/v2/users/profileId:{}", self.api_base, profile_id);
        self.get_json(&url).await
    }

    /// Fetch usage statistics by profile handle
    async fn fetch_stats(&self, profile_id: i64) -> Result<serde_json::Value, Error> {
        let url = format!(
            "{}/api/v1/users/profileId:{}/stats",
            self.api_base, profile_id
        );
        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: StatsEnvelope = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("stats payload: {}", e)))?;
        Ok(envelope.data)
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, Error> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("{}: {}", url, e)))
    }

    /// Full-profile lookup for a single address.
    ///
    /// Profile resolution must succeed; each of the three secondary
    /// fetches (user attributes, stats, score) is contained on failure
    /// and leaves its field absent in the assembled profile.
    pub async fn fetch_profile(&self, address: &str) -> Result<UserProfile, Error> {
        let record = self.resolve_address(address).await?;

        let profile_id = record
            .profile_id
            .ok_or_else(|| Error::NotFound(address.to_string()))?;

        let user = match self.fetch_user(profile_id).await {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(profile_id, error = %e, "User profile not public or unavailable");
                None
            }
        };

        let stats = match self.fetch_stats(profile_id).await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(profile_id, error = %e, "Could not fetch stats");
                None
            }
        };

        let (score, level) = match self.fetch_score(address).await {
            Ok((score, level)) => (Some(score), Some(level)),
            Err(e) => {
                warn!(address = %address, error = %e, "Could not fetch score");
                (None, None)
            }
        };

        Ok(UserProfile {
            profile_id,
            primary_address: record.primary_address,
            all_addresses: record.all_addresses.unwrap_or_default(),
            user,
            stats,
            score,
            level,
        })
    }
}

#[async_trait]
impl ScoreLookup for EthosClient {
    async fn lookup_score(&self, address: &str) -> ScoreOutcome {
        match self.fetch_score(address).await {
            Ok((score, level)) => ScoreOutcome::Success { score, level },
            Err(e) => ScoreOutcome::Failure {
                reason: e.to_string(),
            },
        }
    }
}

/// Map a reqwest error to the transport variant, noting timeouts
fn transport_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Transport(format!("request timed out: {}", e))
    } else {
        Error::Transport(e.to_string())
    }
}

/// Validate a score payload: both fields must be present
fn score_from_response(payload: ScoreResponse) -> Result<(i64, LevelCategory), Error> {
    match (payload.score, payload.level) {
        (Some(score), Some(level)) => Ok((score, LevelCategory::parse(&level))),
        (None, _) => Err(Error::MalformedResponse(
            "score payload missing 'score' field".to_string(),
        )),
        (_, None) => Err(Error::MalformedResponse(
            "score payload missing 'level' field".to_string(),
        )),
    }
}
