use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{FailurePattern, TestCase};

// Builtin catalogs, same JSON shapes the data files use on disk
const BUILTIN_TEST_CASES: &str = include_str!("../data/test_cases.json");
const BUILTIN_FAILURE_PATTERNS: &str = include_str!("../data/failure_patterns.json");
const BUILTIN_TOOL_CATEGORIES: &str = include_str!("../data/tool_categories.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse catalog data: {0}")]
    Parse(#[from] serde_json::Error),
}

// Selector entry: one assessable kind of AI tool, with suggested use cases
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCategory {
    pub id: String,
    pub name: String,
    pub description: String,
    pub use_cases: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct PatternFile {
    patterns: Vec<FailurePattern>,
}

// Read-only configuration supplied at process start: the test-case bank
// keyed by normalized tool-category, the failure-pattern list, and the
// selector entries. Never mutated by the core.
#[derive(Debug, Clone)]
pub struct Catalog {
    test_bank: BTreeMap<String, Vec<TestCase>>,
    patterns: Vec<FailurePattern>,
    tool_categories: Vec<ToolCategory>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(
            BUILTIN_TEST_CASES,
            BUILTIN_FAILURE_PATTERNS,
            BUILTIN_TOOL_CATEGORIES,
        )
    }

    // Load overrides from a directory holding the three standard files
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, CatalogError> {
        let dir = dir.as_ref();
        let tests = read_file(&dir.join("test_cases.json"))?;
        let patterns = read_file(&dir.join("failure_patterns.json"))?;
        let categories = read_file(&dir.join("tool_categories.json"))?;
        Self::from_json(&tests, &patterns, &categories)
    }

    fn from_json(tests: &str, patterns: &str, categories: &str) -> Result<Self, CatalogError> {
        let raw: BTreeMap<String, Vec<TestCase>> = serde_json::from_str(tests)?;
        let test_bank = raw
            .into_iter()
            .map(|(key, cases)| (normalize_key(&key), cases))
            .collect();
        let pattern_file: PatternFile = serde_json::from_str(patterns)?;
        let tool_categories: Vec<ToolCategory> = serde_json::from_str(categories)?;

        Ok(Self {
            test_bank,
            patterns: pattern_file.patterns,
            tool_categories,
        })
    }

    // Test cases for a tool category; empty slice when the key is unknown
    pub fn test_cases_for(&self, category: &str) -> &[TestCase] {
        self.test_bank
            .get(&normalize_key(category))
            .map(|cases| cases.as_slice())
            .unwrap_or(&[])
    }

    pub fn patterns(&self) -> &[FailurePattern] {
        &self.patterns
    }

    pub fn tool_categories(&self) -> &[ToolCategory] {
        &self.tool_categories
    }

    pub fn tool_category(&self, id: &str) -> Option<&ToolCategory> {
        let key = normalize_key(id);
        self.tool_categories
            .iter()
            .find(|c| normalize_key(&c.id) == key)
    }
}

// Category keys are matched case-insensitively with all whitespace removed,
// so "Customer Support" and "customerSupport" address the same bank entry.
pub fn normalize_key(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}

fn read_file(path: &Path) -> Result<String, CatalogError> {
    fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    mod normalize_key_tests {
        use super::*;

        #[test]
        fn lowercases_and_strips_whitespace() {
            assert_eq!(normalize_key("Customer Support"), "customersupport");
            assert_eq!(normalize_key("customerSupport"), "customersupport");
            assert_eq!(normalize_key("  data\tEntry "), "dataentry");
        }

        #[test]
        fn empty_input_stays_empty() {
            assert_eq!(normalize_key(""), "");
            assert_eq!(normalize_key("   "), "");
        }
    }

    mod builtin_tests {
        use super::*;

        #[test]
        fn builtin_catalog_parses() {
            let catalog = Catalog::builtin().unwrap();
            assert_eq!(catalog.tool_categories().len(), 4);
            assert!(!catalog.patterns().is_empty());
        }

        #[test]
        fn every_tool_category_has_test_cases() {
            let catalog = Catalog::builtin().unwrap();
            for tc in catalog.tool_categories() {
                let cases = catalog.test_cases_for(&tc.id);
                assert!(!cases.is_empty(), "no test cases for '{}'", tc.id);
            }
        }

        #[test]
        fn test_ids_are_unique_across_the_bank() {
            let catalog = Catalog::builtin().unwrap();
            let mut seen = HashSet::new();
            for tc in catalog.tool_categories() {
                for case in catalog.test_cases_for(&tc.id) {
                    assert!(seen.insert(case.id.clone()), "duplicate id '{}'", case.id);
                }
            }
        }

        #[test]
        fn test_weights_are_positive() {
            let catalog = Catalog::builtin().unwrap();
            for tc in catalog.tool_categories() {
                for case in catalog.test_cases_for(&tc.id) {
                    assert!(case.weight > 0.0, "non-positive weight on '{}'", case.id);
                }
            }
        }

        #[test]
        fn pattern_ids_are_unique() {
            let catalog = Catalog::builtin().unwrap();
            let mut seen = HashSet::new();
            for p in catalog.patterns() {
                assert!(seen.insert(p.id.clone()), "duplicate pattern '{}'", p.id);
            }
        }

        #[test]
        fn every_trigger_tag_exists_on_some_test() {
            // A trigger no test can ever carry would make the pattern dead data
            let catalog = Catalog::builtin().unwrap();
            let mut tags = HashSet::new();
            for tc in catalog.tool_categories() {
                for case in catalog.test_cases_for(&tc.id) {
                    tags.extend(case.tags.iter().cloned());
                }
            }
            for p in catalog.patterns() {
                for trigger in &p.triggers {
                    assert!(tags.contains(trigger), "orphan trigger '{}'", trigger);
                }
            }
        }

        #[test]
        fn detection_thresholds_are_positive_in_builtin_data() {
            let catalog = Catalog::builtin().unwrap();
            for p in catalog.patterns() {
                assert!(p.detection_threshold > 0, "pattern '{}'", p.id);
            }
        }
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn lookup_is_case_and_whitespace_insensitive() {
            let catalog = Catalog::builtin().unwrap();
            let a = catalog.test_cases_for("customerSupport");
            let b = catalog.test_cases_for("Customer Support");
            let c = catalog.test_cases_for("CUSTOMERSUPPORT");
            assert!(!a.is_empty());
            assert_eq!(a.len(), b.len());
            assert_eq!(a.len(), c.len());
        }

        #[test]
        fn unknown_key_yields_empty_slice() {
            let catalog = Catalog::builtin().unwrap();
            assert!(catalog.test_cases_for("medicalImaging").is_empty());
        }

        #[test]
        fn tool_category_lookup_normalizes() {
            let catalog = Catalog::builtin().unwrap();
            let found = catalog.tool_category("data entry").unwrap();
            assert_eq!(found.id, "dataEntry");
            assert!(catalog.tool_category("nonexistent").is_none());
        }

        #[test]
        fn use_cases_are_listed_for_each_category() {
            let catalog = Catalog::builtin().unwrap();
            for tc in catalog.tool_categories() {
                assert!(!tc.use_cases.is_empty(), "no use cases for '{}'", tc.id);
            }
        }
    }
}
