//! Batch enrichment pipeline

pub mod orchestrator;

pub use orchestrator::{BatchRun, EnrichmentOrchestrator};
