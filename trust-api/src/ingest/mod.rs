//! Tabular ingestion: identifier extraction from uploaded files

pub mod extractor;

pub use extractor::extract_identifiers;
