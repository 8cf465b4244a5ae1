//! Single-address lookup endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::models::UserProfile;
use crate::AppState;

/// POST /api/user request
#[derive(Debug, Deserialize)]
pub struct UserInfoRequest {
    pub address: Option<String>,
}

/// POST /api/user
///
/// Full-profile lookup for one address. Profile resolution is mandatory
/// (404 when the address has no Ethos profile); the secondary enrichments
/// are optional and absent fields mean the corresponding fetch failed.
pub async fn get_user_info(
    State(state): State<AppState>,
    Json(request): Json<UserInfoRequest>,
) -> ApiResult<Json<UserProfile>> {
    let address = request
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Address is required".to_string()))?;

    tracing::info!(address = %address, "Single address lookup");

    match state.client.fetch_profile(address).await {
        Ok(profile) => Ok(Json(profile)),
        Err(e) => {
            *state.last_error.write().await = Some(e.to_string());
            Err(ApiError::from(e))
        }
    }
}

/// Build user lookup routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/api/user", post(get_user_info))
}
