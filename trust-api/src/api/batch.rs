//! Batch enrichment API handlers
//!
//! POST /api/batch uploads a tabular file and starts a background
//! enrichment session; GET /api/batch/:session_id polls it;
//! POST /api/batch/:session_id/filter evaluates filter criteria over a
//! completed session; POST /api/batch/:session_id/cancel aborts a run.

use axum::{
    extract::{Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::filter::{self, FilterCriteria};
use crate::ingest::extract_identifiers;
use crate::models::{BatchSession, BatchState, EnrichmentRecord};
use crate::pipeline::{BatchRun, EnrichmentOrchestrator};
use crate::AppState;
use trust_common::events::TrustEvent;
use trust_common::Error;

/// POST /api/batch response
#[derive(Debug, Serialize)]
pub struct StartBatchResponse {
    pub session_id: Uuid,
    pub state: BatchState,
    /// Number of identifiers queued for enrichment
    pub total: usize,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

/// POST /api/batch/:session_id/filter response
#[derive(Debug, Serialize)]
pub struct FilterResponse {
    pub session_id: Uuid,
    /// Records in the full result set
    pub total: usize,
    /// Records passing the criteria
    pub matched: usize,
    pub results: Vec<EnrichmentRecord>,
}

/// POST /api/batch/:session_id/cancel response
#[derive(Debug, Serialize)]
pub struct CancelBatchResponse {
    pub session_id: Uuid,
    pub state: BatchState,
    /// Identifiers processed before cancellation
    pub processed: usize,
    pub cancelled_at: chrono::DateTime<chrono::Utc>,
}

/// POST /api/batch
///
/// Accepts a multipart upload (`file` field), extracts addresses from the
/// configured column, and starts a background enrichment session. An
/// upload yielding zero addresses is rejected before a session is created.
/// Starting a new batch supersedes any batch still running.
pub async fn start_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<StartBatchResponse>> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Unreadable multipart body: {}", e)))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload.csv").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Unreadable upload: {}", e)))?;
            upload = Some((file_name, bytes.to_vec()));
            break;
        }
    }

    let Some((file_name, bytes)) = upload else {
        return Err(ApiError::BadRequest(
            "CSV or XLSX file is required".to_string(),
        ));
    };

    // Parse the upload in memory; nothing is written to disk
    let identifiers = extract_identifiers(&file_name, &bytes, &state.config.address_column)
        .map_err(ApiError::from)?;

    if identifiers.is_empty() {
        return Err(ApiError::from(Error::EmptyBatch));
    }

    let session = BatchSession::new(file_name, identifiers.len());
    let session_id = session.session_id;
    let response = StartBatchResponse {
        session_id,
        state: session.state,
        total: identifiers.len(),
        started_at: session.started_at,
    };

    state.sessions.write().await.insert(session_id, session);

    // Supersede any batch still running: its in-flight call may finish,
    // but its results will not be delivered.
    let cancel = CancellationToken::new();
    let superseded = {
        let mut active = state.active_batch.write().await;
        active.replace((session_id, cancel.clone()))
    };
    if let Some((old_id, old_token)) = superseded {
        if !old_token.is_cancelled() {
            tracing::info!(
                superseded = %old_id,
                by = %session_id,
                "Cancelling superseded batch session"
            );
            old_token.cancel();
        }
        mark_cancelled(&state, old_id).await;
    }

    state.event_bus.emit(TrustEvent::BatchStarted {
        session_id,
        total: identifiers.len(),
        timestamp: Utc::now(),
    });

    tracing::info!(
        session_id = %session_id,
        total = identifiers.len(),
        "Batch enrichment session started"
    );

    let state_clone = state.clone();
    tokio::spawn(async move {
        run_batch(state_clone, session_id, identifiers, cancel).await;
    });

    Ok(Json(response))
}

/// Background task driving one enrichment session
async fn run_batch(
    state: AppState,
    session_id: Uuid,
    identifiers: Vec<String>,
    cancel: CancellationToken,
) {
    let orchestrator = EnrichmentOrchestrator::new(Arc::clone(&state.client));
    let total = identifiers.len();

    let progress_state = state.clone();
    let run = orchestrator
        .enrich_all(&identifiers, &cancel, |current, total| {
            let state = progress_state.clone();
            async move {
                {
                    let mut sessions = state.sessions.write().await;
                    if let Some(session) = sessions.get_mut(&session_id) {
                        session.update_progress(current);
                    }
                }
                state.event_bus.emit(TrustEvent::BatchProgress {
                    session_id,
                    current,
                    total,
                    percentage: (current as f64 / total as f64) * 100.0,
                    timestamp: Utc::now(),
                });
            }
        })
        .await;

    match run {
        BatchRun::Completed(records) => {
            let succeeded = records.iter().filter(|r| r.is_success()).count();
            let failed = records.len() - succeeded;

            // Delivery is decided under the session lock: only a session
            // still RUNNING receives records. A session cancelled or
            // superseded while the final lookup was in flight has
            // abandoned the job and its results are dropped.
            let delivered = {
                let mut sessions = state.sessions.write().await;
                match sessions.get_mut(&session_id) {
                    Some(session) if session.state == BatchState::Running => {
                        session.records = records;
                        session.update_progress(total);
                        session.transition_to(BatchState::Completed);
                        true
                    }
                    _ => false,
                }
            };

            if delivered {
                state.event_bus.emit(TrustEvent::BatchCompleted {
                    session_id,
                    succeeded,
                    failed,
                    timestamp: Utc::now(),
                });
                tracing::info!(
                    session_id = %session_id,
                    succeeded,
                    failed,
                    "Batch enrichment session completed"
                );
            } else {
                tracing::info!(
                    session_id = %session_id,
                    "Batch finished after cancellation; results dropped"
                );
            }
        }
        BatchRun::Cancelled { processed } => {
            tracing::debug!(session_id = %session_id, processed, "Batch run cancelled");
            mark_cancelled(&state, session_id).await;
        }
    }
}

/// Transition a session to CANCELLED unless a handler already did
async fn mark_cancelled(state: &AppState, session_id: Uuid) {
    let processed = {
        let mut sessions = state.sessions.write().await;
        match sessions.get_mut(&session_id) {
            Some(session) if session.state == BatchState::Running => {
                session.transition_to(BatchState::Cancelled);
                Some(session.progress.current)
            }
            _ => None,
        }
    };

    if let Some(processed) = processed {
        state.event_bus.emit(TrustEvent::BatchCancelled {
            session_id,
            processed,
            timestamp: Utc::now(),
        });
        tracing::info!(session_id = %session_id, processed, "Batch session cancelled");
    }
}

/// GET /api/batch/:session_id
///
/// Poll session state, progress, and (once completed) the result records.
pub async fn get_batch_status(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<BatchSession>> {
    let session = state
        .sessions
        .read()
        .await
        .get(&session_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Batch session not found: {}", session_id)))?;

    Ok(Json(session))
}

/// POST /api/batch/:session_id/filter
///
/// Evaluate filter criteria over a completed session's records. Pure view:
/// the stored result set is never mutated, and repeated calls with the
/// same criteria return the same subsequence.
pub async fn filter_batch(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(criteria): Json<FilterCriteria>,
) -> ApiResult<Json<FilterResponse>> {
    let session = state
        .sessions
        .read()
        .await
        .get(&session_id)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("Batch session not found: {}", session_id)))?;

    if session.state != BatchState::Completed {
        return Err(ApiError::Conflict(format!(
            "Batch session not completed: {:?}",
            session.state
        )));
    }

    let results = filter::apply(&session.records, &criteria);

    Ok(Json(FilterResponse {
        session_id,
        total: session.records.len(),
        matched: results.len(),
        results,
    }))
}

/// POST /api/batch/:session_id/cancel
///
/// Cancel a running session. In-flight remote calls may complete, but no
/// records are delivered for a cancelled session.
pub async fn cancel_batch(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<CancelBatchResponse>> {
    let processed = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&session_id).ok_or_else(|| {
            ApiError::NotFound(format!("Batch session not found: {}", session_id))
        })?;

        if session.is_terminal() {
            return Err(ApiError::BadRequest(format!(
                "Batch session already in terminal state: {:?}",
                session.state
            )));
        }

        session.transition_to(BatchState::Cancelled);
        session.progress.current
    };

    // Stop the background loop from issuing further remote calls
    {
        let active = state.active_batch.read().await;
        if let Some((active_id, token)) = active.as_ref() {
            if *active_id == session_id {
                token.cancel();
            }
        }
    }

    state.event_bus.emit(TrustEvent::BatchCancelled {
        session_id,
        processed,
        timestamp: Utc::now(),
    });
    tracing::info!(session_id = %session_id, "Batch session cancelled by request");

    Ok(Json(CancelBatchResponse {
        session_id,
        state: BatchState::Cancelled,
        processed,
        cancelled_at: Utc::now(),
    }))
}

/// Build batch enrichment routes
pub fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/api/batch", post(start_batch))
        .route("/api/batch/:session_id", get(get_batch_status))
        .route("/api/batch/:session_id/filter", post(filter_batch))
        .route("/api/batch/:session_id/cancel", post(cancel_batch))
}
