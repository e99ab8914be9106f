//! Pattern catalog
//!
//! Named regular expressions describing the shim's trace format, each with the
//! capture groups it contributes and the command it belongs to.

pub mod defaults;
pub mod pattern;

// Re-export key types for convenience
pub use defaults::default_records;
pub use pattern::{CatalogRecord, PatternCatalog, PatternDefinition};
