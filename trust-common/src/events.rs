//! Event types for the trustcheck event system
//!
//! Provides batch lifecycle event definitions and the EventBus used to
//! broadcast them to SSE subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Trustcheck event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TrustEvent {
    /// Batch enrichment session started
    BatchStarted {
        session_id: Uuid,
        /// Number of identifiers queued for enrichment
        total: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Per-identifier progress update, emitted after each lookup completes
    BatchProgress {
        session_id: Uuid,
        /// Identifiers processed so far (monotonically non-decreasing)
        current: usize,
        total: usize,
        /// Percentage complete (0.0 - 100.0)
        percentage: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Batch enrichment session finished; every input identifier has a record
    BatchCompleted {
        session_id: Uuid,
        /// Records with score/level populated
        succeeded: usize,
        /// Records carrying a contained lookup failure
        failed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Batch session cancelled (user request or superseded by a newer batch)
    BatchCancelled {
        session_id: Uuid,
        /// Identifiers processed before cancellation took effect
        processed: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl TrustEvent {
    /// Event type name for SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            TrustEvent::BatchStarted { .. } => "BatchStarted",
            TrustEvent::BatchProgress { .. } => "BatchProgress",
            TrustEvent::BatchCompleted { .. } => "BatchCompleted",
            TrustEvent::BatchCancelled { .. } => "BatchCancelled",
        }
    }
}

/// Broadcast bus for TrustEvents
///
/// Cloneable handle over a tokio broadcast channel. Emitting with no
/// subscribers is not an error; events are simply dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<TrustEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<TrustEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the number of subscribers that received the event.
    pub fn emit(&self, event: TrustEvent) -> usize {
        match self.tx.send(event) {
            Ok(count) => count,
            Err(_) => {
                // No subscribers; not an error
                tracing::trace!("Event emitted with no subscribers");
                0
            }
        }
    }
}
