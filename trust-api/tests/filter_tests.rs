//! Result filter engine tests
//!
//! The engine is a pure function over the result set: idempotent,
//! order-preserving, and the identity under all-absent criteria.

use trust_api::filter::{self, FilterCriteria, ResultStatus, ScoreBand};
use trust_api::models::{EnrichmentRecord, LevelCategory};

/// The three-record scenario: success / contained failure / success
fn scenario_records() -> Vec<EnrichmentRecord> {
    vec![
        EnrichmentRecord::success("0xAA".to_string(), 1700, LevelCategory::Reputable),
        EnrichmentRecord::failure("0xBB".to_string()),
        EnrichmentRecord::success("0xCC".to_string(), 750, LevelCategory::Untrusted),
    ]
}

#[test]
fn all_absent_criteria_is_identity() {
    let records = scenario_records();
    let filtered = filter::apply(&records, &FilterCriteria::default());
    assert_eq!(filtered, records);
}

#[test]
fn filtering_is_idempotent() {
    let records = scenario_records();
    let criteria = FilterCriteria {
        search: "0x".to_string(),
        score_band: Some(ScoreBand::High),
        ..FilterCriteria::default()
    };

    let once = filter::apply(&records, &criteria);
    let twice = filter::apply(&once, &criteria);
    assert_eq!(once, twice);
}

#[test]
fn filtering_does_not_mutate_input() {
    let records = scenario_records();
    let snapshot = records.clone();
    let criteria = FilterCriteria {
        status: Some(ResultStatus::NonUser),
        ..FilterCriteria::default()
    };
    let _ = filter::apply(&records, &criteria);
    assert_eq!(records, snapshot);
}

#[test]
fn high_band_selects_only_the_1700_record() {
    let records = scenario_records();
    let criteria = FilterCriteria {
        score_band: Some(ScoreBand::High),
        ..FilterCriteria::default()
    };

    let filtered = filter::apply(&records, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].address, "0xAA");
}

#[test]
fn non_user_status_selects_only_the_failed_record() {
    let records = scenario_records();
    let criteria = FilterCriteria {
        status: Some(ResultStatus::NonUser),
        ..FilterCriteria::default()
    };

    let filtered = filter::apply(&records, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].address, "0xBB");
    assert!(filtered[0].error.is_some());
}

#[test]
fn ethos_user_status_selects_successful_records() {
    let records = scenario_records();
    let criteria = FilterCriteria {
        status: Some(ResultStatus::EthosUser),
        ..FilterCriteria::default()
    };

    let filtered = filter::apply(&records, &criteria);
    let addresses: Vec<&str> = filtered.iter().map(|r| r.address.as_str()).collect();
    assert_eq!(addresses, vec!["0xAA", "0xCC"]);
}

#[test]
fn score_band_boundaries_are_exact() {
    let records = vec![
        EnrichmentRecord::success("exact-2000".to_string(), 2000, LevelCategory::Reputable),
        EnrichmentRecord::success("exact-800".to_string(), 800, LevelCategory::Questionable),
    ];

    // Score exactly 2000 matches Very-high, not High or Medium
    let very_high = filter::apply(
        &records,
        &FilterCriteria {
            score_band: Some(ScoreBand::VeryHigh),
            ..FilterCriteria::default()
        },
    );
    assert_eq!(very_high.len(), 1);
    assert_eq!(very_high[0].address, "exact-2000");

    let high = filter::apply(
        &records,
        &FilterCriteria {
            score_band: Some(ScoreBand::High),
            ..FilterCriteria::default()
        },
    );
    assert!(high.is_empty());

    // Score exactly 800 matches Low, not Bad
    let low = filter::apply(
        &records,
        &FilterCriteria {
            score_band: Some(ScoreBand::Low),
            ..FilterCriteria::default()
        },
    );
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].address, "exact-800");

    let bad = filter::apply(
        &records,
        &FilterCriteria {
            score_band: Some(ScoreBand::Bad),
            ..FilterCriteria::default()
        },
    );
    assert!(bad.is_empty());
}

#[test]
fn absent_score_never_matches_any_band() {
    let records = vec![EnrichmentRecord::failure("0xBB".to_string())];
    for band in [
        ScoreBand::VeryHigh,
        ScoreBand::High,
        ScoreBand::Medium,
        ScoreBand::Low,
        ScoreBand::Bad,
    ] {
        let criteria = FilterCriteria {
            score_band: Some(band),
            ..FilterCriteria::default()
        };
        assert!(filter::apply(&records, &criteria).is_empty());
    }
}

#[test]
fn absent_level_never_matches_a_set_level_filter() {
    let records = scenario_records();
    let criteria = FilterCriteria {
        level: Some(LevelCategory::Reputable),
        ..FilterCriteria::default()
    };

    let filtered = filter::apply(&records, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].address, "0xAA");
}

#[test]
fn level_filter_is_case_insensitive() {
    let records = vec![EnrichmentRecord::success(
        "0xAA".to_string(),
        1700,
        LevelCategory::Other("Legendary".to_string()),
    )];
    let criteria = FilterCriteria {
        level: Some(LevelCategory::Other("legendary".to_string())),
        ..FilterCriteria::default()
    };

    assert_eq!(filter::apply(&records, &criteria).len(), 1);
}

#[test]
fn search_is_case_insensitive_substring() {
    let records = scenario_records();
    let criteria = FilterCriteria {
        search: "xaa".to_string(),
        ..FilterCriteria::default()
    };

    let filtered = filter::apply(&records, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].address, "0xAA");
}

#[test]
fn empty_search_matches_everything() {
    let records = scenario_records();
    let criteria = FilterCriteria {
        search: String::new(),
        ..FilterCriteria::default()
    };
    assert_eq!(filter::apply(&records, &criteria).len(), records.len());
}

#[test]
fn predicates_combine_with_logical_and() {
    let records = vec![
        EnrichmentRecord::success("0xAA11".to_string(), 1700, LevelCategory::Reputable),
        EnrichmentRecord::success("0xAA22".to_string(), 750, LevelCategory::Untrusted),
        EnrichmentRecord::success("0xBB11".to_string(), 1700, LevelCategory::Reputable),
    ];
    let criteria = FilterCriteria {
        search: "0xaa".to_string(),
        score_band: Some(ScoreBand::High),
        level: Some(LevelCategory::Reputable),
        status: Some(ResultStatus::EthosUser),
    };

    let filtered = filter::apply(&records, &criteria);
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].address, "0xAA11");
}

#[test]
fn filter_preserves_input_order() {
    let records = vec![
        EnrichmentRecord::success("0x03".to_string(), 900, LevelCategory::Neutral),
        EnrichmentRecord::success("0x01".to_string(), 950, LevelCategory::Neutral),
        EnrichmentRecord::success("0x02".to_string(), 850, LevelCategory::Neutral),
    ];
    let criteria = FilterCriteria {
        score_band: Some(ScoreBand::Low),
        ..FilterCriteria::default()
    };

    let filtered = filter::apply(&records, &criteria);
    let addresses: Vec<&str> = filtered.iter().map(|r| r.address.as_str()).collect();
    assert_eq!(addresses, vec!["0x03", "0x01", "0x02"]);
}
