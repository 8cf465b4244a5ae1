//! trust-api - Ethos trust checker backend
//!
//! HTTP service enriching wallet addresses with Ethos reputation data:
//! single-address full-profile lookup, batch CSV/XLSX enrichment with SSE
//! progress, and server-side result filtering.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use trust_common::events::EventBus;
use trust_common::TrustConfig;

use trust_api::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting trust-api (Ethos trust checker)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = TrustConfig::load();
    info!("Ethos API base: {}", config.api_base);

    let port = config.port;

    // Event bus for SSE broadcasting
    let event_bus = EventBus::new(100);

    let state = AppState::new(config, event_bus)
        .map_err(|e| anyhow::anyhow!("Failed to initialize application state: {}", e))?;

    let app = trust_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Listening on http://0.0.0.0:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;

    Ok(())
}
