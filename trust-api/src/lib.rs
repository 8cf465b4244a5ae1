//! trust-api - Ethos trust checker service
//!
//! Enriches batches of wallet addresses with Ethos reputation data
//! (numeric score + qualitative trust tier), with per-identifier failure
//! containment, live progress over SSE, and a pure filter engine over the
//! enriched result set.

pub mod api;
pub mod error;
pub mod ethos;
pub mod filter;
pub mod ingest;
pub mod models;
pub mod pipeline;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use trust_common::events::EventBus;
use trust_common::TrustConfig;
use uuid::Uuid;

use crate::ethos::EthosClient;
use crate::models::BatchSession;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<TrustConfig>,
    /// Ethos API client, shared by batch and single lookups
    pub client: Arc<EthosClient>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// In-memory batch sessions, keyed by session id
    pub sessions: Arc<RwLock<HashMap<Uuid, BatchSession>>>,
    /// The currently running batch and its cancellation token.
    /// Starting a new batch supersedes (cancels) the previous one.
    pub active_batch: Arc<RwLock<Option<(Uuid, CancellationToken)>>>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: TrustConfig, event_bus: EventBus) -> Result<Self, trust_common::Error> {
        let client = Arc::new(EthosClient::new(&config)?);
        Ok(Self {
            config: Arc::new(config),
            client,
            event_bus,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            active_batch: Arc::new(RwLock::new(None)),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let cors = match &state.config.allowed_origin {
        Some(origin) => match origin.parse() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(AllowOrigin::exact(origin))
                .allow_methods(Any)
                .allow_headers(Any),
            Err(_) => {
                tracing::warn!(origin = %origin, "Invalid allowed_origin, allowing any");
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    };

    Router::new()
        .merge(api::batch_routes())
        .merge(api::user_routes())
        .merge(api::health_routes())
        .route("/api/events", get(api::event_stream))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
