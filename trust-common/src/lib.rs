//! # Trustcheck Common Library
//!
//! Shared code for the trustcheck service:
//! - Error taxonomy (Error enum)
//! - Event types (TrustEvent enum) and EventBus
//! - Configuration loading

pub mod config;
pub mod error;
pub mod events;

pub use config::TrustConfig;
pub use error::{Error, Result};
