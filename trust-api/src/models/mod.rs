//! Data models for trust-api

pub mod batch_session;
pub mod profile;
pub mod record;

pub use batch_session::{BatchProgress, BatchSession, BatchState};
pub use profile::UserProfile;
pub use record::{EnrichmentRecord, LevelCategory, LOOKUP_FAILED_TAG};
