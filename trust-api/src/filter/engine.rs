//! Compound predicate evaluation over a result set
//!
//! Pure and stateless: filtering never mutates the input, is idempotent,
//! and is safe to re-evaluate on every keystroke of the search term.
//! All predicates are ANDed; each absent criterion matches everything.

use serde::{Deserialize, Serialize};

use crate::models::{EnrichmentRecord, LevelCategory};

/// Named half-open score interval (inclusive lower, exclusive upper)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreBand {
    /// [2000, 2400)
    VeryHigh,
    /// [1600, 2000)
    High,
    /// [1200, 1600)
    Medium,
    /// [800, 1200)
    Low,
    /// (-inf, 800)
    Bad,
}

impl ScoreBand {
    /// Whether a score falls in this band
    pub fn contains(&self, score: i64) -> bool {
        match self {
            ScoreBand::VeryHigh => (2000..2400).contains(&score),
            ScoreBand::High => (1600..2000).contains(&score),
            ScoreBand::Medium => (1200..1600).contains(&score),
            ScoreBand::Low => (800..1200).contains(&score),
            ScoreBand::Bad => score < 800,
        }
    }
}

/// Record status: whether the lookup succeeded for this identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    /// Lookup succeeded; the identifier has an Ethos score
    #[serde(rename = "Ethos User")]
    EthosUser,
    /// Lookup failed; record carries the error tag
    #[serde(rename = "Non User")]
    NonUser,
}

/// Live filter criteria; every field independently optional
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring match over the address; empty matches all
    #[serde(default)]
    pub search: String,
    /// Exact trust-tier match
    #[serde(default)]
    pub level: Option<LevelCategory>,
    /// Score interval match
    #[serde(default)]
    pub score_band: Option<ScoreBand>,
    /// Success/failure status match
    #[serde(default)]
    pub status: Option<ResultStatus>,
}

impl FilterCriteria {
    /// True when no criterion is set; filtering is then the identity
    pub fn is_empty(&self) -> bool {
        self.search.is_empty()
            && self.level.is_none()
            && self.score_band.is_none()
            && self.status.is_none()
    }

    /// Whether a single record passes every active predicate
    pub fn matches(&self, record: &EnrichmentRecord) -> bool {
        self.matches_search(record)
            && self.matches_level(record)
            && self.matches_score(record)
            && self.matches_status(record)
    }

    fn matches_search(&self, record: &EnrichmentRecord) -> bool {
        if self.search.is_empty() {
            return true;
        }
        record
            .address
            .to_lowercase()
            .contains(&self.search.to_lowercase())
    }

    fn matches_level(&self, record: &EnrichmentRecord) -> bool {
        match &self.level {
            None => true,
            // A record without a level never matches a set level filter
            Some(wanted) => match &record.level {
                Some(level) => level.matches(wanted),
                None => false,
            },
        }
    }

    fn matches_score(&self, record: &EnrichmentRecord) -> bool {
        match self.score_band {
            None => true,
            // A record without a score never matches any band
            Some(band) => match record.score {
                Some(score) => band.contains(score),
                None => false,
            },
        }
    }

    fn matches_status(&self, record: &EnrichmentRecord) -> bool {
        match self.status {
            None => true,
            Some(ResultStatus::EthosUser) => record.error.is_none(),
            Some(ResultStatus::NonUser) => record.error.is_some(),
        }
    }
}

/// Filter a result set, preserving order.
///
/// Returns the subsequence of records passing every active predicate.
pub fn apply(records: &[EnrichmentRecord], criteria: &FilterCriteria) -> Vec<EnrichmentRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}
