//! Pattern definitions and the catalog that holds them
//!
//! A catalog is built once from a list of [`CatalogRecord`]s and is read-only
//! afterwards, so it can be shared across parser threads by reference.

use crate::types::{CommandTag, DecoderError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Marker embedded in pattern text that lists the capture groups to keep
static GROUP_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*GROUPS_\(([^)]*)\)\*").expect("group marker regex is valid")
});

/// Load-time description of one pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Unique key used for lookups
    pub name: String,
    /// Regex source, optionally carrying a `*GROUPS_(i,j,...)*` marker
    pub pattern: String,
    /// Command this pattern belongs to
    #[serde(default)]
    pub command: CommandTag,
}

impl CatalogRecord {
    /// Create a record; the pattern may still carry its group marker
    pub fn new(name: impl Into<String>, pattern: impl Into<String>, command: CommandTag) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            command,
        }
    }
}

/// A compiled, immutable pattern
#[derive(Debug, Clone)]
pub struct PatternDefinition {
    name: String,
    regex: Regex,
    command: CommandTag,
    selectors: Vec<usize>,
}

impl PatternDefinition {
    /// Compile a record, stripping and parsing its group marker
    pub fn from_record(record: &CatalogRecord) -> Result<Self> {
        // the marker is not regex syntax and must go before compiling
        let (source, selectors) = split_group_marker(&record.name, &record.pattern);
        let regex = Regex::new(&source).map_err(|e| DecoderError::InvalidPattern {
            name: record.name.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: record.name.clone(),
            regex,
            command: record.command,
            selectors,
        })
    }

    /// Catalog key of this pattern
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Regex source with the group marker removed
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Compiled regex
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Command the pattern belongs to, `None` for shared patterns
    pub fn command(&self) -> CommandTag {
        self.command
    }

    /// Capture group indices to keep, in output order (0 = whole match)
    pub fn selectors(&self) -> &[usize] {
        &self.selectors
    }

    /// Number of capture groups, not counting the whole match
    pub fn group_count(&self) -> usize {
        self.regex.captures_len().saturating_sub(1)
    }
}

/// Strip the `*GROUPS_(...)*` marker from `pattern` and parse its index list
///
/// No marker selects the whole match. A list that does not parse also falls
/// back to the whole match.
pub(crate) fn split_group_marker(name: &str, pattern: &str) -> (String, Vec<usize>) {
    let Some(captures) = GROUP_MARKER.captures(pattern) else {
        return (pattern.trim().to_string(), vec![0]);
    };

    let stripped = GROUP_MARKER.replace(pattern, "").trim().to_string();
    let list = captures.get(1).map_or("", |m| m.as_str());

    let selectors: std::result::Result<Vec<usize>, _> =
        list.split(',').map(|item| item.trim().parse::<usize>()).collect();

    match selectors {
        Ok(selectors) => (stripped, selectors),
        Err(e) => {
            log::warn!(
                "Malformed group list '{}' in pattern '{}': {}, using whole match",
                list,
                name,
                e
            );
            (stripped, vec![0])
        }
    }
}

/// Ordered, read-only set of pattern definitions
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    patterns: Vec<PatternDefinition>,
}

impl PatternCatalog {
    /// Build a catalog from load-time records
    ///
    /// Records whose regex does not compile are skipped. Fails only when no
    /// usable definition remains.
    pub fn load<'a, I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a CatalogRecord>,
    {
        let mut patterns = Vec::new();

        for record in records {
            match PatternDefinition::from_record(record) {
                Ok(definition) => {
                    log::trace!(
                        "Loaded pattern '{}' with groups {:?}",
                        definition.name,
                        definition.selectors
                    );
                    patterns.push(definition);
                }
                Err(e) => log::warn!("Skipping catalog record: {}", e),
            }
        }

        if patterns.is_empty() {
            return Err(DecoderError::EmptyCatalog);
        }

        log::debug!("Pattern catalog loaded with {} definitions", patterns.len());
        Ok(Self { patterns })
    }

    /// Build the catalog describing the shim's own trace format
    pub fn builtin() -> Result<Self> {
        Self::load(&super::default_records())
    }

    /// First definition whose name contains `name`, ignoring case
    pub fn lookup(&self, name: &str) -> Option<&PatternDefinition> {
        let query = name.to_uppercase();
        self.patterns
            .iter()
            .find(|definition| definition.name.to_uppercase().contains(&query))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternDefinition> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
