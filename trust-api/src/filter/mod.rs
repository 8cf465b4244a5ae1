//! Result filter engine

pub mod engine;

pub use engine::{apply, FilterCriteria, ResultStatus, ScoreBand};
