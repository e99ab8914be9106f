//! PassThru Log Decoder Library
//!
//! A stateless, reusable library for decoding the call traces a J2534
//! PassThru driver shim writes into structured command expressions.
//!
//! # Architecture
//!
//! This library is intentionally focused on parsing:
//! - A pattern catalog of named regular expressions describes the trace format
//! - The trace is split into command blocks and each block is classified
//! - Each block becomes an [`Expression`]: typed fields with pass/fail verdicts
//!   plus nested messages, filter parts or IOCTL parameters
//!
//! The library does NOT:
//! - Read or write files
//! - Print reports
//! - Track state across commands (device/channel lifetimes)
//!
//! All file handling and output is in the application layer (passthru-log-cli).
//!
//! # Example Usage
//!
//! ```
//! use passthru_log_decoder::{CommandTag, LogParser, ParserConfig, PatternCatalog};
//!
//! let trace = "0.102s ++ PTOpen( \"J2534\", 0x00001234 )\n\
//!              \x20 returning DeviceID: 4\n\
//!              0.110s 0:STATUS_NOERROR\n";
//!
//! // Build the catalog once and share it by reference
//! let catalog = PatternCatalog::builtin().unwrap();
//! let parser = LogParser::new(&catalog, ParserConfig::new().with_parallel(false));
//!
//! let report = parser.parse_log(trace).unwrap();
//! let open = &report.expressions[0];
//! assert_eq!(open.command(), CommandTag::Open);
//! assert_eq!(open.value("Device ID"), Some("4"));
//! assert!(open.passed());
//! ```

// Public modules
pub mod catalog;
pub mod config;
pub mod expression;
pub mod extractor;
pub mod nested;
pub mod parser;
pub mod render;
pub mod splitter;
pub mod types;
pub mod variants;

// Re-export main types for convenience
pub use catalog::{default_records, CatalogRecord, PatternCatalog, PatternDefinition};
pub use config::{BlockBoundary, ParserConfig};
pub use expression::Expression;
pub use extractor::{evaluate, evaluate_all, evaluate_named, Extraction};
pub use parser::{BlockFailure, LogParser, ParseReport, ParseSummary};
pub use splitter::{LogSplitter, RawBlock};
pub use types::{
    CommandTag, DecoderError, FieldDescriptor, FieldValue, NestedContent, NestedRecord, Result,
    MISSING_ID, REGEX_FAILED, STATUS_NOERROR,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: the built-in catalog loads and parses a bare block
        let catalog = PatternCatalog::builtin().unwrap();
        let expression =
            Expression::parse("0.1s -- PTClose(1)\n0.2s 0:STATUS_NOERROR", &catalog).unwrap();
        assert_eq!(expression.command(), CommandTag::Close);
        assert!(!VERSION.is_empty());
    }
}
