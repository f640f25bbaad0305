use std::collections::HashMap;

use crate::models::{FailurePattern, TestCase, TestResult, Verdict};

// Failure patterns triggered by the current results, in catalog order.
//
// A pattern fires when the number of distinct failed test cases sharing at
// least one tag with its triggers reaches detectionThreshold. A case
// matching several triggers still counts once. Thresholds <= 0 are taken
// at face value and are trivially satisfied.
pub fn detect_patterns(
    test_cases: &[TestCase],
    results: &[TestResult],
    patterns: &[FailurePattern],
) -> Vec<FailurePattern> {
    let by_id: HashMap<&str, &TestResult> = results
        .iter()
        .map(|r| (r.test_id.as_str(), r))
        .collect();

    patterns
        .iter()
        .filter(|pattern| {
            let failures = test_cases
                .iter()
                .filter(|case| {
                    let failed = matches!(
                        by_id.get(case.id.as_str()),
                        Some(r) if r.result == Verdict::Fail
                    );
                    failed
                        && case
                            .tags
                            .iter()
                            .any(|tag| pattern.triggers.iter().any(|t| t == tag))
                })
                .count() as i64;
            failures >= pattern.detection_threshold
        })
        .cloned()
        .collect()
}
