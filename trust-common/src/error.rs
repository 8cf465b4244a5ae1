//! Common error types for trustcheck

use thiserror::Error;

/// Common result type for trustcheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the Ethos client, the ingestion layer and the
/// batch pipeline.
///
/// Per-identifier remote errors in batch mode never surface as `Error` —
/// they are contained into failed records by the orchestrator. The variants
/// here describe the failures that do propagate.
#[derive(Error, Debug)]
pub enum Error {
    /// Network or connection failure talking to the reputation service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status from the reputation service
    #[error("Reputation service returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    /// Identifier has no Ethos profile (terminal for full-profile lookup)
    #[error("No Ethos profile found for {0}")]
    NotFound(String),

    /// Response payload did not have the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Tabular input was structurally unreadable
    #[error("Parse error: {0}")]
    Parse(String),

    /// Zero identifiers extracted from the uploaded file
    #[error("No addresses found in uploaded file")]
    EmptyBatch,

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
