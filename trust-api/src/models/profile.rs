//! Full-profile lookup result

use serde::{Deserialize, Serialize};

use super::record::LevelCategory;

/// Assembled result of a single-address full-profile lookup.
///
/// Profile resolution is mandatory; the three secondary enrichments
/// (user attributes, usage stats, score) are each optional and a failed
/// fetch leaves the corresponding field absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Ethos profile handle resolved from the address
    pub profile_id: i64,

    /// Primary address attached to the profile
    pub primary_address: Option<String>,

    /// All addresses attached to the profile
    #[serde(default)]
    pub all_addresses: Vec<String>,

    /// Profile attributes, passed through as returned by the service
    pub user: Option<serde_json::Value>,

    /// Usage statistics, passed through as returned by the service
    pub stats: Option<serde_json::Value>,

    /// Numeric trust score
    pub score: Option<i64>,

    /// Qualitative trust tier
    pub level: Option<LevelCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_for_the_frontend() {
        let profile = UserProfile {
            profile_id: 42,
            primary_address: Some("0xAA".to_string()),
            all_addresses: vec!["0xAA".to_string()],
            user: None,
            stats: None,
            score: Some(1700),
            level: Some(LevelCategory::Reputable),
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["profileId"], 42);
        assert_eq!(json["primaryAddress"], "0xAA");
        assert_eq!(json["allAddresses"][0], "0xAA");
        assert_eq!(json["level"], "reputable");
    }
}
