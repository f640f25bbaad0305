use std::collections::{BTreeMap, HashMap};

use crate::models::{Category, CategoryScore, ScoreBreakdown, TestCase, TestResult, Verdict};

// Global category weights. Kept as a table so a different weighting (or a
// new category) is a data change, not a code change.
#[derive(Debug, Clone)]
pub struct CategoryWeights {
    entries: Vec<(Category, f64)>,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::new(vec![
            (Category::Accuracy, 0.4),
            (Category::EdgeCases, 0.3),
            (Category::Security, 0.1),
            (Category::Ux, 0.2),
        ])
    }
}

impl CategoryWeights {
    pub fn new(entries: Vec<(Category, f64)>) -> Self {
        Self { entries }
    }

    #[allow(dead_code)]
    pub fn weight_of(&self, category: Category) -> Option<f64> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, w)| *w)
    }

    pub fn entries(&self) -> &[(Category, f64)] {
        &self.entries
    }
}

// Credit multiplier for a rated verdict; None while pending, so unrated
// tests contribute to neither earned nor possible weight.
fn factor(verdict: Verdict) -> Option<f64> {
    match verdict {
        Verdict::Pass => Some(1.0),
        Verdict::Partial => Some(0.5),
        Verdict::Fail => Some(0.0),
        Verdict::Pending => None,
    }
}

// Weighted readiness score over the supplied cases and results.
//
// Returns None only when the test-case set itself is empty ("no score", as
// opposed to a score of zero). Each category is normalized over its rated
// tests; categories with nothing rated keep possible == 0 and stay out of
// the weighted overall. Tests in a category without a weight entry are
// excluded entirely.
pub fn compute_score(
    test_cases: &[TestCase],
    results: &[TestResult],
    weights: &CategoryWeights,
) -> Option<ScoreBreakdown> {
    if test_cases.is_empty() {
        return None;
    }

    let by_id: HashMap<&str, &TestResult> = results
        .iter()
        .map(|r| (r.test_id.as_str(), r))
        .collect();

    let mut categories = BTreeMap::new();
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for &(category, weight) in weights.entries() {
        let cases: Vec<&TestCase> = test_cases
            .iter()
            .filter(|t| t.category == category)
            .collect();
        if cases.is_empty() {
            continue;
        }

        let mut earned = 0.0;
        let mut possible = 0.0;
        let mut passed = 0;

        for case in &cases {
            // A case without a matching result counts as pending
            let verdict = by_id
                .get(case.id.as_str())
                .map(|r| r.result)
                .unwrap_or(Verdict::Pending);
            if let Some(f) = factor(verdict) {
                earned += case.weight * f;
                possible += case.weight;
                if verdict == Verdict::Pass {
                    passed += 1;
                }
            }
        }

        let score = if possible > 0.0 {
            (100.0 * earned / possible).round() as u32
        } else {
            0
        };

        if possible > 0.0 {
            weighted_sum += score as f64 * weight;
            total_weight += weight;
        }

        categories.insert(
            category,
            CategoryScore {
                score,
                passed,
                total: cases.len(),
                weight,
                possible,
            },
        );
    }

    let overall = if total_weight > 0.0 {
        (weighted_sum / total_weight).round() as u32
    } else {
        0
    };

    Some(ScoreBreakdown {
        overall,
        categories,
    })
}
