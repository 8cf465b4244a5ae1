//! Batch enrichment session state machine
//!
//! A session is created per uploaded file and progresses
//! RUNNING → COMPLETED | CANCELLED. Sessions live in memory for the life
//! of the process; there is no persistence across restarts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::EnrichmentRecord;

/// Batch session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BatchState {
    /// Enrichment loop in progress
    Running,
    /// Every input identifier has a record
    Completed,
    /// Cancelled by user request or superseded by a newer batch
    Cancelled,
}

/// Progress tracking for a running session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Identifiers processed so far
    pub current: usize,
    /// Total identifiers in the batch
    pub total: usize,
    /// Percentage complete (0.0 - 100.0)
    pub percentage: f64,
}

impl BatchProgress {
    pub fn new(total: usize) -> Self {
        Self {
            current: 0,
            total,
            percentage: 0.0,
        }
    }
}

/// Batch enrichment session (in-memory state)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSession {
    /// Unique session identifier
    pub session_id: Uuid,

    /// Current state
    pub state: BatchState,

    /// Name of the uploaded file, for display
    pub file_name: String,

    /// Progress tracking
    pub progress: BatchProgress,

    /// Ordered result records, index-aligned with the input identifiers.
    /// Populated only when the session completes; a cancelled session
    /// delivers no records.
    pub records: Vec<EnrichmentRecord>,

    /// Session start time
    pub started_at: DateTime<Utc>,

    /// Session end time (if completed/cancelled)
    pub ended_at: Option<DateTime<Utc>>,
}

impl BatchSession {
    /// Create a new running session for `total` identifiers
    pub fn new(file_name: String, total: usize) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            state: BatchState::Running,
            file_name,
            progress: BatchProgress::new(total),
            records: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Transition to a new state, stamping `ended_at` on terminal states
    pub fn transition_to(&mut self, new_state: BatchState) {
        self.state = new_state;
        if self.is_terminal() {
            self.ended_at = Some(Utc::now());
        }
    }

    /// Update the progress counters
    pub fn update_progress(&mut self, current: usize) {
        self.progress.current = current;
        self.progress.percentage = if self.progress.total > 0 {
            (current as f64 / self.progress.total as f64) * 100.0
        } else {
            0.0
        };
    }

    /// Check if the session is finished
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, BatchState::Completed | BatchState::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_starts_running() {
        let session = BatchSession::new("wallets.csv".to_string(), 5);
        assert_eq!(session.state, BatchState::Running);
        assert_eq!(session.progress.total, 5);
        assert_eq!(session.progress.current, 0);
        assert!(session.ended_at.is_none());
        assert!(!session.is_terminal());
    }

    #[test]
    fn terminal_transition_sets_end_time() {
        let mut session = BatchSession::new("wallets.csv".to_string(), 2);
        session.transition_to(BatchState::Completed);
        assert!(session.is_terminal());
        assert!(session.ended_at.is_some());
    }

    #[test]
    fn progress_percentage_tracks_current() {
        let mut session = BatchSession::new("wallets.csv".to_string(), 4);
        session.update_progress(1);
        assert!((session.progress.percentage - 25.0).abs() < f64::EPSILON);
        session.update_progress(4);
        assert!((session.progress.percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_total_keeps_percentage_at_zero() {
        let mut session = BatchSession::new("empty.csv".to_string(), 0);
        session.update_progress(0);
        assert_eq!(session.progress.percentage, 0.0);
    }
}
