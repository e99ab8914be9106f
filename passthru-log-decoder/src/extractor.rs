//! Field extraction
//!
//! Applies one pattern definition to a block of trace text and returns the
//! selected capture values. A pattern that does not match yields the
//! `REGEX_FAILED` sentinel rather than an error.

use crate::catalog::{PatternCatalog, PatternDefinition};
use crate::types::REGEX_FAILED;
use regex::Captures;

/// Outcome of applying one pattern to a text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Whether the pattern matched at all
    pub matched: bool,
    /// Selected values, or the single sentinel on failure
    pub values: Vec<String>,
    /// Whole match (group 0), when matched
    pub whole: Option<String>,
    /// Every capture group of the match; non-participating groups are empty
    pub groups: Vec<String>,
}

impl Extraction {
    fn failed() -> Self {
        Self {
            matched: false,
            values: vec![REGEX_FAILED.to_string()],
            whole: None,
            groups: Vec::new(),
        }
    }

    fn from_captures(pattern: &PatternDefinition, captures: &Captures<'_>) -> Self {
        let groups = collect_groups(captures);
        Self {
            matched: true,
            values: select(pattern.selectors(), &groups),
            whole: groups.first().cloned(),
            groups,
        }
    }

    /// Last capture group that produced text, falling back to the whole match
    pub fn last_group(&self) -> Option<&str> {
        self.groups
            .iter()
            .skip(1)
            .rev()
            .find(|group| !group.is_empty())
            .or_else(|| self.groups.first())
            .map(String::as_str)
    }
}

fn collect_groups(captures: &Captures<'_>) -> Vec<String> {
    captures
        .iter()
        .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
        .collect()
}

/// Apply `selectors` to a full capture list (index 0 = whole match)
///
/// All-zero selectors return the whole match untouched. Otherwise each
/// selected group is trimmed, and selectors past the end are skipped.
pub(crate) fn select(selectors: &[usize], groups: &[String]) -> Vec<String> {
    if selectors.iter().all(|&index| index == 0) {
        return vec![groups.first().cloned().unwrap_or_default()];
    }

    selectors
        .iter()
        .filter_map(|&index| groups.get(index))
        .map(|group| group.trim().to_string())
        .collect()
}

/// Apply `pattern` to `text`, returning its first match
pub fn evaluate(text: &str, pattern: &PatternDefinition) -> Extraction {
    match pattern.regex().captures(text) {
        Some(captures) => Extraction::from_captures(pattern, &captures),
        None => {
            log::debug!("Pattern '{}' did not match", pattern.name());
            Extraction::failed()
        }
    }
}

/// Apply `pattern` to every non-overlapping match in `text`
pub fn evaluate_all(text: &str, pattern: &PatternDefinition) -> Vec<Vec<String>> {
    pattern
        .regex()
        .captures_iter(text)
        .map(|captures| select(pattern.selectors(), &collect_groups(&captures)))
        .collect()
}

/// Look up `name` in the catalog and evaluate it; an unknown name is a non-match
pub fn evaluate_named(text: &str, catalog: &PatternCatalog, name: &str) -> Extraction {
    match catalog.lookup(name) {
        Some(pattern) => evaluate(text, pattern),
        None => {
            log::debug!("Pattern '{}' not found in catalog", name);
            Extraction::failed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogRecord;
    use crate::types::CommandTag;

    fn definition(pattern: &str) -> PatternDefinition {
        PatternDefinition::from_record(&CatalogRecord::new("Test", pattern, CommandTag::None))
            .unwrap()
    }

    #[test]
    fn test_whole_match_without_marker() {
        let pattern = definition(r"PTClose\(\d+\)");
        let result = evaluate("0.1s -- PTClose(1) done", &pattern);
        assert!(result.matched);
        assert_eq!(result.values, vec!["PTClose(1)"]);
        assert_eq!(result.whole.as_deref(), Some("PTClose(1)"));
    }

    #[test]
    fn test_selected_groups_trimmed_in_order() {
        let pattern = definition(r"a=([^,]*),b=([^,]*) *GROUPS_(2,1)*");
        let result = evaluate("a= one ,b= two ", &pattern);
        assert_eq!(result.values, vec!["two", "one"]);
    }

    #[test]
    fn test_out_of_range_selector_skipped() {
        let pattern = definition(r"id=(\d+) *GROUPS_(1,5)*");
        let result = evaluate("id=42", &pattern);
        assert_eq!(result.values, vec!["42"]);
    }

    #[test]
    fn test_non_participating_group_is_empty() {
        let pattern = definition(r"x(a)?(b) *GROUPS_(1,2)*");
        let result = evaluate("xb", &pattern);
        assert_eq!(result.values, vec!["", "b"]);
    }

    #[test]
    fn test_no_match_returns_sentinel() {
        let pattern = definition(r"PTOpen *GROUPS_(1)*");
        let result = evaluate("nothing here", &pattern);
        assert!(!result.matched);
        assert_eq!(result.values, vec![REGEX_FAILED]);
        assert!(result.whole.is_none());
    }

    #[test]
    fn test_evaluate_all_keeps_source_order() {
        let pattern = definition(r"(\w+)=(\d+) *GROUPS_(1,2)*");
        let all = evaluate_all("A=1 B=2 C=3", &pattern);
        assert_eq!(all.len(), 3);
        assert_eq!(all[2], vec!["C", "3"]);
    }

    #[test]
    fn test_evaluate_named_unknown_is_failure() {
        let catalog = PatternCatalog::builtin().unwrap();
        let result = evaluate_named("0.1s ++ PTOpen(, 0x1)", &catalog, "NoSuchPattern");
        assert!(!result.matched);
        assert_eq!(result.values, vec![REGEX_FAILED]);
    }

    #[test]
    fn test_last_group() {
        let pattern = definition(r"(\d+\.\d+s)\s+(x)?");
        let result = evaluate("0.250s y", &pattern);
        assert_eq!(result.last_group(), Some("0.250s"));
    }
}
