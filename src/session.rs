use chrono::Utc;

use crate::catalog::Catalog;
use crate::models::{
    ConfigError, EvaluationSession, FailurePattern, ScoreBreakdown, TestCase, TestResult,
    ToolConfig, Verdict,
};
use crate::patterns::detect_patterns;
use crate::scoring::{compute_score, CategoryWeights};

// Controller for one assessment at a time. Holds the catalog, the active
// session (if any), and the derived views. Every mutation goes through a
// method that ends in recompute(), so score and patterns can never be
// stale relative to the result set.
pub struct Vetting {
    catalog: Catalog,
    weights: CategoryWeights,
    session: Option<EvaluationSession>,
    score: Option<ScoreBreakdown>,
    patterns: Vec<FailurePattern>,
}

impl Vetting {
    pub fn new(catalog: Catalog) -> Self {
        Self::with_weights(catalog, CategoryWeights::default())
    }

    pub fn with_weights(catalog: Catalog, weights: CategoryWeights) -> Self {
        Self {
            catalog,
            weights,
            session: None,
            score: None,
            patterns: Vec::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&EvaluationSession> {
        self.session.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // Submit a tool config and generate its test set. Rejects incomplete
    // configs before touching any state. An unknown category produces an
    // empty test set (and therefore no score), not an error. Re-submitting
    // while active regenerates from scratch: all prior results are
    // discarded, even for coinciding test ids.
    pub fn select_tool(&mut self, config: ToolConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let test_cases: Vec<TestCase> = self.catalog.test_cases_for(&config.category).to_vec();
        let results: Vec<TestResult> = test_cases
            .iter()
            .map(|t| TestResult::pending(&t.id))
            .collect();

        let now = Utc::now();
        self.session = Some(EvaluationSession {
            id: now.timestamp_millis().to_string(),
            tool_config: config,
            test_cases,
            results,
            started_at: now.to_rfc3339(),
            ended_at: None,
            final_score: None,
        });
        self.recompute();
        Ok(())
    }

    // Overwrite the result for one test. Unknown ids and an explicit
    // Pending verdict are ignored without touching anything.
    pub fn record_result(&mut self, test_id: &str, verdict: Verdict, notes: Option<&str>) {
        if !verdict.is_rated() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(result) = session.results.iter_mut().find(|r| r.test_id == test_id) else {
            return;
        };

        result.result = verdict;
        result.notes = notes.unwrap_or("").to_string();
        result.timestamp = Some(Utc::now().to_rfc3339());
        self.recompute();
    }

    // Back to tool selection. Nothing of the discarded session survives
    // unless it was persisted externally.
    pub fn reset(&mut self) {
        self.session = None;
        self.recompute();
    }

    // Close out the active session: stamp the end time and the score
    // snapshot, hand the completed record to the caller, and return the
    // controller to the uninitialized state.
    pub fn finalize(&mut self) -> Option<EvaluationSession> {
        let mut session = self.session.take()?;
        session.ended_at = Some(Utc::now().to_rfc3339());
        session.final_score = compute_score(&session.test_cases, &session.results, &self.weights);
        self.recompute();
        Some(session)
    }

    // Fraction of tests rated, as a percentage of the active set
    pub fn progress(&self) -> f64 {
        let Some(session) = &self.session else {
            return 0.0;
        };
        if session.results.is_empty() {
            return 0.0;
        }
        let rated = session.results.iter().filter(|r| r.is_rated()).count();
        rated as f64 / session.results.len() as f64 * 100.0
    }

    pub fn score_breakdown(&self) -> Option<&ScoreBreakdown> {
        self.score.as_ref()
    }

    pub fn detected_patterns(&self) -> &[FailurePattern] {
        &self.patterns
    }

    pub fn pending_tests(&self) -> Vec<&TestCase> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        session
            .test_cases
            .iter()
            .filter(|t| {
                session
                    .results
                    .iter()
                    .find(|r| r.test_id == t.id)
                    .map(|r| !r.is_rated())
                    .unwrap_or(true)
            })
            .collect()
    }

    pub fn completed_results(&self) -> Vec<&TestResult> {
        self.session
            .iter()
            .flat_map(|s| s.results.iter())
            .filter(|r| r.is_rated())
            .collect()
    }

    pub fn test_case(&self, test_id: &str) -> Option<&TestCase> {
        self.session
            .as_ref()
            .and_then(|s| s.test_cases.iter().find(|t| t.id == test_id))
    }

    pub fn result_for(&self, test_id: &str) -> Option<&TestResult> {
        self.session
            .as_ref()
            .and_then(|s| s.results.iter().find(|r| r.test_id == test_id))
    }

    // First unrated test in bank order, for "what's next" flows
    pub fn next_pending(&self) -> Option<&TestCase> {
        self.pending_tests().into_iter().next()
    }

    pub fn snapshot(&self) -> Option<EvaluationSession> {
        self.session.clone()
    }

    // Re-adopt a persisted session. Derived views are recomputed, so a
    // reloaded session scores identically to the one that was saved.
    pub fn restore(&mut self, session: EvaluationSession) {
        self.session = Some(session);
        self.recompute();
    }

    fn recompute(&mut self) {
        match &self.session {
            Some(s) => {
                self.score = compute_score(&s.test_cases, &s.results, &self.weights);
                self.patterns = detect_patterns(&s.test_cases, &s.results, self.catalog.patterns());
            }
            None => {
                self.score = None;
                self.patterns.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn vetting() -> Vetting {
        Vetting::new(Catalog::builtin().expect("builtin catalog should parse"))
    }

    fn config_for(category: &str) -> ToolConfig {
        ToolConfig {
            id: "1".to_string(),
            name: "Test Tool".to_string(),
            category: category.to_string(),
            use_case: "General customer support".to_string(),
            industry: None,
            expected_users: None,
        }
    }

    mod select_tool_tests {
        use super::*;

        #[test]
        fn generates_one_pending_result_per_test_case() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();

            let session = v.session().unwrap();
            assert!(!session.test_cases.is_empty());
            assert_eq!(session.results.len(), session.test_cases.len());
            assert!(session.results.iter().all(|r| !r.is_rated()));
        }

        #[test]
        fn rejects_incomplete_config_without_mutating() {
            let mut v = vetting();
            let mut bad = config_for("customerSupport");
            bad.name = "  ".to_string();

            assert_eq!(v.select_tool(bad), Err(ConfigError::MissingName));
            assert!(!v.is_active());
            assert!(v.score_breakdown().is_none());
        }

        #[test]
        fn unknown_category_yields_empty_set_and_no_score() {
            let mut v = vetting();
            v.select_tool(config_for("medicalImaging")).unwrap();

            assert!(v.is_active());
            assert!(v.session().unwrap().test_cases.is_empty());
            assert!(v.score_breakdown().is_none());
            assert_eq!(v.progress(), 0.0);
        }

        #[test]
        fn category_key_is_normalized() {
            let mut v = vetting();
            v.select_tool(config_for("Customer Support")).unwrap();
            assert!(!v.session().unwrap().test_cases.is_empty());
        }

        #[test]
        fn reselecting_discards_prior_results() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            let first_id = v.session().unwrap().test_cases[0].id.clone();
            v.record_result(&first_id, Verdict::Pass, None);
            assert_eq!(v.completed_results().len(), 1);

            // Same category, same test ids: results still start over
            v.select_tool(config_for("customerSupport")).unwrap();
            assert!(v.completed_results().is_empty());
            assert_eq!(v.progress(), 0.0);
        }
    }

    mod record_result_tests {
        use super::*;

        #[test]
        fn overwrites_result_notes_and_timestamp() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            let id = v.session().unwrap().test_cases[0].id.clone();

            v.record_result(&id, Verdict::Partial, Some("slow but correct"));

            let r = v.result_for(&id).unwrap();
            assert_eq!(r.result, Verdict::Partial);
            assert_eq!(r.notes, "slow but correct");
            assert!(r.timestamp.is_some());
        }

        #[test]
        fn rerating_replaces_the_previous_verdict() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            let id = v.session().unwrap().test_cases[0].id.clone();

            v.record_result(&id, Verdict::Fail, Some("first try"));
            v.record_result(&id, Verdict::Pass, None);

            let r = v.result_for(&id).unwrap();
            assert_eq!(r.result, Verdict::Pass);
            assert_eq!(r.notes, "");
            assert_eq!(v.completed_results().len(), 1);
        }

        #[test]
        fn unknown_test_id_is_a_no_op() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            let before = v.score_breakdown().cloned();

            v.record_result("no-such-test", Verdict::Pass, None);

            assert_eq!(v.score_breakdown().cloned(), before);
            assert!(v.completed_results().is_empty());
        }

        #[test]
        fn explicit_pending_is_ignored() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            let id = v.session().unwrap().test_cases[0].id.clone();
            v.record_result(&id, Verdict::Pass, None);

            v.record_result(&id, Verdict::Pending, None);

            assert_eq!(v.result_for(&id).unwrap().result, Verdict::Pass);
        }

        #[test]
        fn idempotent_for_repeated_identical_verdicts() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            let id = v.session().unwrap().test_cases[0].id.clone();

            v.record_result(&id, Verdict::Pass, Some("n"));
            let once = v.score_breakdown().cloned();
            v.record_result(&id, Verdict::Pass, Some("n"));

            assert_eq!(v.score_breakdown().cloned(), once);
        }

        #[test]
        fn score_and_patterns_update_together() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();

            // cs-005 is tagged pii/data-leakage; the exposure pattern has
            // threshold 1, so one failure flips both derived views at once
            v.record_result("cs-005", Verdict::Fail, None);

            let breakdown = v.score_breakdown().unwrap();
            assert_eq!(breakdown.score_for(Category::Security), Some(0));
            assert!(v
                .detected_patterns()
                .iter()
                .any(|p| p.id == "sensitive-data-exposure"));
        }
    }

    mod progress_tests {
        use super::*;

        #[test]
        fn progress_is_zero_before_selection() {
            assert_eq!(vetting().progress(), 0.0);
        }

        #[test]
        fn progress_tracks_rated_fraction() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            let total = v.session().unwrap().results.len();
            let id = v.session().unwrap().test_cases[0].id.clone();

            v.record_result(&id, Verdict::Pass, None);

            let expected = 1.0 / total as f64 * 100.0;
            assert!((v.progress() - expected).abs() < 1e-9);
        }

        #[test]
        fn pending_and_completed_partition_the_set() {
            let mut v = vetting();
            v.select_tool(config_for("dataEntry")).unwrap();
            let total = v.session().unwrap().test_cases.len();
            let id = v.session().unwrap().test_cases[0].id.clone();

            v.record_result(&id, Verdict::Fail, None);

            assert_eq!(v.pending_tests().len(), total - 1);
            assert_eq!(v.completed_results().len(), 1);
            assert_eq!(v.next_pending().unwrap().id, v.session().unwrap().test_cases[1].id);
        }
    }

    mod reset_tests {
        use super::*;

        #[test]
        fn reset_discards_everything() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            let id = v.session().unwrap().test_cases[0].id.clone();
            v.record_result(&id, Verdict::Fail, None);

            v.reset();

            assert!(!v.is_active());
            assert!(v.score_breakdown().is_none());
            assert!(v.pending_tests().is_empty());
            assert!(v.detected_patterns().is_empty());
            assert_eq!(v.progress(), 0.0);
        }
    }

    mod finalize_tests {
        use super::*;

        #[test]
        fn finalize_stamps_end_time_and_score_snapshot() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            let ids: Vec<String> = v
                .session()
                .unwrap()
                .test_cases
                .iter()
                .map(|t| t.id.clone())
                .collect();
            for id in &ids {
                v.record_result(id, Verdict::Pass, None);
            }

            let done = v.finalize().unwrap();
            assert!(done.ended_at.is_some());
            assert_eq!(done.final_score.as_ref().unwrap().overall, 100);
            assert!(!v.is_active());
        }

        #[test]
        fn finalize_without_a_session_returns_none() {
            assert!(vetting().finalize().is_none());
        }
    }

    mod snapshot_tests {
        use super::*;

        #[test]
        fn serde_round_trip_reproduces_score_and_patterns() {
            let mut v = vetting();
            v.select_tool(config_for("customerSupport")).unwrap();
            v.record_result("cs-001", Verdict::Pass, Some("good"));
            v.record_result("cs-003", Verdict::Partial, None);
            v.record_result("cs-005", Verdict::Fail, None);
            v.record_result("cs-006", Verdict::Fail, None);

            let saved_score = v.score_breakdown().cloned().unwrap();
            let saved_patterns: Vec<String> = v
                .detected_patterns()
                .iter()
                .map(|p| p.id.clone())
                .collect();

            let json = serde_json::to_string(&v.snapshot().unwrap()).unwrap();
            let reloaded: EvaluationSession = serde_json::from_str(&json).unwrap();

            let mut fresh = vetting();
            fresh.restore(reloaded);

            assert_eq!(fresh.score_breakdown().cloned().unwrap(), saved_score);
            let fresh_patterns: Vec<String> = fresh
                .detected_patterns()
                .iter()
                .map(|p| p.id.clone())
                .collect();
            assert_eq!(fresh_patterns, saved_patterns);
            assert_eq!(fresh.progress(), v.progress());
        }

        #[test]
        fn snapshot_is_none_when_uninitialized() {
            assert!(vetting().snapshot().is_none());
        }
    }
}
