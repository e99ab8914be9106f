//! Parser configuration types
//!
//! This module defines the settings the log parser needs: how a trace is cut
//! into command blocks and how those blocks are scheduled. Pattern definitions
//! live in the catalog, not here.

use serde::{Deserialize, Serialize};

/// How a raw trace is cut into command blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockBoundary {
    /// Each line matching the command-time pattern starts a new block
    #[default]
    CommandHeader,
    /// Blocks are delimited by a fixed record-separator character
    Separator(char),
}

/// Configuration for the log parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Parse blocks on a worker pool instead of one at a time
    #[serde(default = "default_true")]
    pub parallel: bool,

    /// Worker count for parallel parsing (None = rayon's global pool)
    #[serde(default)]
    pub worker_threads: Option<usize>,

    /// Block boundary detection
    #[serde(default)]
    pub boundary: BlockBoundary,

    /// Optional: stop after this many blocks
    #[serde(default)]
    pub max_blocks: Option<usize>,
}

fn default_true() -> bool {
    true
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            parallel: default_true(),
            worker_threads: None,
            boundary: BlockBoundary::default(),
            max_blocks: None,
        }
    }
}

impl ParserConfig {
    /// Create a new parser configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable or disable parallel parsing
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Builder method: pin the worker count
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    /// Builder method: set block boundary detection
    pub fn with_boundary(mut self, boundary: BlockBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    /// Builder method: split on a record-separator character
    pub fn with_separator(self, separator: char) -> Self {
        self.with_boundary(BlockBoundary::Separator(separator))
    }

    /// Builder method: limit the number of parsed blocks
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = Some(max_blocks);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_config_builder() {
        let config = ParserConfig::new()
            .with_parallel(false)
            .with_worker_threads(4)
            .with_separator('\u{1e}')
            .with_max_blocks(10);

        assert!(!config.parallel);
        assert_eq!(config.worker_threads, Some(4));
        assert_eq!(config.boundary, BlockBoundary::Separator('\u{1e}'));
        assert_eq!(config.max_blocks, Some(10));
    }

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert!(config.parallel);
        assert_eq!(config.boundary, BlockBoundary::CommandHeader);

        let parsed: ParserConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_boundary_serde() {
        let parsed: ParserConfig =
            serde_json::from_str(r#"{"parallel": false, "boundary": {"separator": "|"}}"#).unwrap();
        assert_eq!(parsed.boundary, BlockBoundary::Separator('|'));
        assert!(!parsed.parallel);
    }
}
