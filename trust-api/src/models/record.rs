//! Per-identifier enrichment result types

use serde::{Deserialize, Serialize};

/// Fixed error tag recorded on contained lookup failures.
///
/// The specific remote reason is logged, not surfaced, so every failed
/// record has a uniform shape.
pub const LOOKUP_FAILED_TAG: &str = "Failed to fetch score";

/// Qualitative trust tier returned by the Ethos score API.
///
/// Known tiers form a closed set; unknown values from the service pass
/// through as `Other` rather than failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LevelCategory {
    Untrusted,
    Questionable,
    Neutral,
    Reputable,
    Exemplary,
    /// Unrecognized tier, preserved verbatim for display
    Other(String),
}

impl LevelCategory {
    /// Parse a wire-format level string, case-insensitively
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "untrusted" => LevelCategory::Untrusted,
            "questionable" => LevelCategory::Questionable,
            "neutral" => LevelCategory::Neutral,
            "reputable" => LevelCategory::Reputable,
            "exemplary" => LevelCategory::Exemplary,
            _ => LevelCategory::Other(s.to_string()),
        }
    }

    /// Wire-format string for this tier
    pub fn as_str(&self) -> &str {
        match self {
            LevelCategory::Untrusted => "untrusted",
            LevelCategory::Questionable => "questionable",
            LevelCategory::Neutral => "neutral",
            LevelCategory::Reputable => "reputable",
            LevelCategory::Exemplary => "exemplary",
            LevelCategory::Other(s) => s.as_str(),
        }
    }

    /// Case-insensitive equality, used by the filter engine
    pub fn matches(&self, other: &LevelCategory) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl From<String> for LevelCategory {
    fn from(s: String) -> Self {
        LevelCategory::parse(&s)
    }
}

impl From<LevelCategory> for String {
    fn from(level: LevelCategory) -> Self {
        level.as_str().to_string()
    }
}

impl std::fmt::Display for LevelCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-identifier enrichment result
///
/// Invariant: either `score`/`level` are populated and `error` is absent
/// (successful lookup), or `error` is populated and `score`/`level` are
/// absent (contained failure). Never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    /// Input identifier, preserved verbatim
    pub address: String,
    /// Numeric trust score, absent on failure
    pub score: Option<i64>,
    /// Qualitative trust tier, absent on failure
    pub level: Option<LevelCategory>,
    /// Fixed failure tag, absent on success
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl EnrichmentRecord {
    /// Record for a successful lookup
    pub fn success(address: String, score: i64, level: LevelCategory) -> Self {
        Self {
            address,
            score: Some(score),
            level: Some(level),
            error: None,
        }
    }

    /// Record for a contained lookup failure
    pub fn failure(address: String) -> Self {
        Self {
            address,
            score: None,
            level: None,
            error: Some(LOOKUP_FAILED_TAG.to_string()),
        }
    }

    /// True when the record carries score/level data
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
