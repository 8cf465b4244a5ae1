//! Ethos reputation API integration

pub mod client;

pub use client::{EthosClient, ScoreLookup, ScoreOutcome};
