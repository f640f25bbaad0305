// Several enum helpers are public API for catalog tooling but not used by
// the CLI/TUI yet
#![allow(dead_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Scoring categories for test cases. Catalog data may carry categories this
// build doesn't know about; those land in Other and stay out of scoring.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Accuracy,
    EdgeCases,
    Security,
    Ux,
    #[serde(other)]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Accuracy => "accuracy",
            Category::EdgeCases => "edge_cases",
            Category::Security => "security",
            Category::Ux => "ux",
            Category::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "accuracy" => Category::Accuracy,
            "edge_cases" | "edge-cases" | "edgecases" => Category::EdgeCases,
            "security" => Category::Security,
            "ux" | "user_experience" => Category::Ux,
            _ => Category::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Accuracy => "Accuracy",
            Category::EdgeCases => "Edge Cases",
            Category::Security => "Security",
            Category::Ux => "User Experience",
            Category::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Basic => "basic",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "basic" | "b" => Some(Difficulty::Basic),
            "intermediate" | "i" => Some(Difficulty::Intermediate),
            "advanced" | "a" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

// The human judgment recorded for a test prompt. Pending is the initial
// "not yet rated" state; users never set it explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pending,
    Pass,
    Fail,
    Partial,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pending => "pending",
            Verdict::Pass => "pass",
            Verdict::Fail => "fail",
            Verdict::Partial => "partial",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pass" | "p" | "yes" | "y" | "good" => Some(Verdict::Pass),
            "fail" | "f" | "no" | "n" | "bad" => Some(Verdict::Fail),
            "partial" | "x" | "part" | "half" => Some(Verdict::Partial),
            "pending" => Some(Verdict::Pending),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pending => "Pending",
            Verdict::Pass => "Pass",
            Verdict::Fail => "Fail",
            Verdict::Partial => "Partial",
        }
    }

    pub fn is_rated(&self) -> bool {
        !matches!(self, Verdict::Pending)
    }
}

// Severity of a detected failure pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    Critical,
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Critical => "critical",
            Impact::High => "high",
            Impact::Medium => "medium",
            Impact::Low => "low",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Impact::Critical => "Critical",
            Impact::High => "High",
            Impact::Medium => "Medium",
            Impact::Low => "Low",
        }
    }
}

// A scripted scenario from the catalog. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub category: Category,
    pub scenario: String,
    pub input: String,
    pub expected_behavior: String,
    pub weight: f64,
    pub tags: Vec<String>,
    pub difficulty: Difficulty,
}

// One per active test case, created pending when the test set is generated.
// timestamp is set on every transition out of pending and on re-rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_id: String,
    pub result: Verdict,
    pub notes: String,
    pub timestamp: Option<String>,
}

impl TestResult {
    pub fn pending(test_id: &str) -> Self {
        Self {
            test_id: test_id.to_string(),
            result: Verdict::Pending,
            notes: String::new(),
            timestamp: None,
        }
    }

    pub fn is_rated(&self) -> bool {
        self.result.is_rated()
    }
}

// A named risk signature from the catalog. Triggered when enough tests
// carrying one of its trigger tags fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailurePattern {
    pub id: String,
    pub name: String,
    pub triggers: Vec<String>,
    pub description: String,
    pub impact: Impact,
    pub remediation: Vec<String>,
    pub detection_threshold: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tool name is required")]
    MissingName,
    #[error("tool category is required")]
    MissingCategory,
    #[error("use case is required")]
    MissingUseCase,
}

// User-entered description of the tool under assessment. Immutable once the
// test set has been generated from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    pub id: String,
    pub name: String,
    pub category: String,
    pub use_case: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_users: Option<u64>,
}

impl ToolConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingName);
        }
        if self.category.trim().is_empty() {
            return Err(ConfigError::MissingCategory);
        }
        if self.use_case.trim().is_empty() {
            return Err(ConfigError::MissingUseCase);
        }
        Ok(())
    }
}

// Per-category decomposition of the readiness score. possible is the summed
// weight of rated tests; a category with possible == 0 is excluded from the
// weighted overall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScore {
    pub score: u32,
    pub passed: usize,
    pub total: usize,
    pub weight: f64,
    pub possible: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub overall: u32,
    pub categories: BTreeMap<Category, CategoryScore>,
}

impl ScoreBreakdown {
    pub fn score_for(&self, category: Category) -> Option<u32> {
        self.categories.get(&category).map(|c| c.score)
    }
}

// The overall unit of work: one tool, one generated test set, one result
// per test. Discarded wholesale on reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSession {
    pub id: String,
    pub tool_config: ToolConfig,
    pub test_cases: Vec<TestCase>,
    pub results: Vec<TestResult>,
    pub started_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<ScoreBreakdown>,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod category_tests {
        use super::*;

        #[test]
        fn as_str_round_trips() {
            for c in [
                Category::Accuracy,
                Category::EdgeCases,
                Category::Security,
                Category::Ux,
            ] {
                assert_eq!(Category::from_str(c.as_str()), c);
            }
        }

        #[test]
        fn from_str_unknown_maps_to_other() {
            assert_eq!(Category::from_str("performance"), Category::Other);
            assert_eq!(Category::from_str(""), Category::Other);
        }

        #[test]
        fn from_str_case_insensitive() {
            assert_eq!(Category::from_str("ACCURACY"), Category::Accuracy);
            assert_eq!(Category::from_str("Edge_Cases"), Category::EdgeCases);
        }

        #[test]
        fn serde_uses_snake_case() {
            let json = serde_json::to_string(&Category::EdgeCases).unwrap();
            assert_eq!(json, "\"edge_cases\"");
        }

        #[test]
        fn serde_unknown_deserializes_to_other() {
            let c: Category = serde_json::from_str("\"latency\"").unwrap();
            assert_eq!(c, Category::Other);
        }

        #[test]
        fn label_returns_human_readable() {
            assert_eq!(Category::EdgeCases.label(), "Edge Cases");
            assert_eq!(Category::Ux.label(), "User Experience");
        }
    }

    mod verdict_tests {
        use super::*;

        #[test]
        fn as_str_returns_correct_values() {
            assert_eq!(Verdict::Pending.as_str(), "pending");
            assert_eq!(Verdict::Pass.as_str(), "pass");
            assert_eq!(Verdict::Fail.as_str(), "fail");
            assert_eq!(Verdict::Partial.as_str(), "partial");
        }

        #[test]
        fn from_str_pass_variants() {
            for v in ["pass", "p", "yes", "y", "good", "PASS"] {
                assert_eq!(Verdict::from_str(v), Some(Verdict::Pass), "for '{}'", v);
            }
        }

        #[test]
        fn from_str_fail_variants() {
            for v in ["fail", "f", "no", "n", "bad", "Fail"] {
                assert_eq!(Verdict::from_str(v), Some(Verdict::Fail), "for '{}'", v);
            }
        }

        #[test]
        fn from_str_partial_variants() {
            for v in ["partial", "x", "part", "half"] {
                assert_eq!(Verdict::from_str(v), Some(Verdict::Partial), "for '{}'", v);
            }
        }

        #[test]
        fn from_str_invalid_returns_none() {
            assert!(Verdict::from_str("invalid").is_none());
            assert!(Verdict::from_str("").is_none());
        }

        #[test]
        fn only_pending_is_unrated() {
            assert!(!Verdict::Pending.is_rated());
            assert!(Verdict::Pass.is_rated());
            assert!(Verdict::Fail.is_rated());
            assert!(Verdict::Partial.is_rated());
        }
    }

    mod test_result_tests {
        use super::*;

        #[test]
        fn pending_constructor_has_no_timestamp() {
            let r = TestResult::pending("tc-1");
            assert_eq!(r.test_id, "tc-1");
            assert_eq!(r.result, Verdict::Pending);
            assert!(r.notes.is_empty());
            assert!(r.timestamp.is_none());
            assert!(!r.is_rated());
        }

        #[test]
        fn serializes_camel_case() {
            let r = TestResult::pending("tc-1");
            let json = serde_json::to_string(&r).unwrap();
            assert!(json.contains("\"testId\":\"tc-1\""));
        }
    }

    mod test_case_tests {
        use super::*;

        #[test]
        fn serializes_camel_case() {
            let tc = TestCase {
                id: "cs-001".to_string(),
                category: Category::Accuracy,
                scenario: "Scenario".to_string(),
                input: "input".to_string(),
                expected_behavior: "expected".to_string(),
                weight: 10.0,
                tags: vec!["pii".to_string()],
                difficulty: Difficulty::Basic,
            };
            let json = serde_json::to_string(&tc).unwrap();
            assert!(json.contains("\"expectedBehavior\""));
            assert!(json.contains("\"category\":\"accuracy\""));
        }

        #[test]
        fn deserializes_unknown_category_to_other() {
            let json = r#"{
                "id": "z-1",
                "category": "throughput",
                "scenario": "s",
                "input": "i",
                "expectedBehavior": "e",
                "weight": 5,
                "tags": [],
                "difficulty": "basic"
            }"#;
            let tc: TestCase = serde_json::from_str(json).unwrap();
            assert_eq!(tc.category, Category::Other);
        }
    }

    mod tool_config_tests {
        use super::*;

        fn valid_config() -> ToolConfig {
            ToolConfig {
                id: "1".to_string(),
                name: "Support Bot".to_string(),
                category: "customerSupport".to_string(),
                use_case: "General customer support".to_string(),
                industry: None,
                expected_users: None,
            }
        }

        #[test]
        fn validate_accepts_complete_config() {
            assert!(valid_config().validate().is_ok());
        }

        #[test]
        fn validate_rejects_blank_name() {
            let mut c = valid_config();
            c.name = "   ".to_string();
            assert_eq!(c.validate(), Err(ConfigError::MissingName));
        }

        #[test]
        fn validate_rejects_empty_category() {
            let mut c = valid_config();
            c.category = String::new();
            assert_eq!(c.validate(), Err(ConfigError::MissingCategory));
        }

        #[test]
        fn validate_rejects_blank_use_case() {
            let mut c = valid_config();
            c.use_case = "\t".to_string();
            assert_eq!(c.validate(), Err(ConfigError::MissingUseCase));
        }

        #[test]
        fn optional_fields_are_skipped_when_absent() {
            let json = serde_json::to_string(&valid_config()).unwrap();
            assert!(!json.contains("industry"));
            assert!(!json.contains("expectedUsers"));
        }
    }

    mod json_output_tests {
        use super::*;

        #[test]
        fn ok_wraps_data() {
            let output = JsonOutput::ok(42);
            assert!(output.success);
            assert_eq!(output.data, Some(42));
            assert!(output.error.is_none());
        }

        #[test]
        fn err_wraps_message() {
            let output = JsonOutput::<()>::err("something went wrong");
            assert!(!output.success);
            assert!(output.data.is_none());
            assert_eq!(output.error, Some("something went wrong".to_string()));
        }

        #[test]
        fn serializes_ok_correctly() {
            let json = serde_json::to_string(&JsonOutput::ok("test")).unwrap();
            assert!(json.contains("\"success\":true"));
            assert!(json.contains("\"data\":\"test\""));
        }
    }

    mod score_breakdown_tests {
        use super::*;

        #[test]
        fn score_for_returns_present_categories_only() {
            let mut categories = BTreeMap::new();
            categories.insert(
                Category::Accuracy,
                CategoryScore {
                    score: 75,
                    passed: 1,
                    total: 2,
                    weight: 0.4,
                    possible: 15.0,
                },
            );
            let breakdown = ScoreBreakdown {
                overall: 75,
                categories,
            };
            assert_eq!(breakdown.score_for(Category::Accuracy), Some(75));
            assert_eq!(breakdown.score_for(Category::Security), None);
        }

        #[test]
        fn category_map_serializes_with_string_keys() {
            let mut categories = BTreeMap::new();
            categories.insert(
                Category::EdgeCases,
                CategoryScore {
                    score: 50,
                    passed: 0,
                    total: 1,
                    weight: 0.3,
                    possible: 8.0,
                },
            );
            let breakdown = ScoreBreakdown {
                overall: 50,
                categories,
            };
            let json = serde_json::to_string(&breakdown).unwrap();
            assert!(json.contains("\"edge_cases\""));
            assert!(json.contains("\"possible\":8.0"));
        }
    }
}
