//! Parameter lists of PTIoctl blocks
//!
//! ```text
//!   \__ 1:DATA_RATE = 500000
//!   \__ LOOPBACK = 0
//! ```

use crate::catalog::PatternCatalog;
use crate::extractor::evaluate_all;
use crate::types::NestedRecord;

const PARAMETER_FIELDS: &[&str] = &["Parameter ID", "Parameter Name", "Parameter Value"];

/// Every `[id:]NAME = value` parameter line of the block, in source order
pub fn parse_parameters(text: &str, catalog: &PatternCatalog) -> Vec<NestedRecord> {
    let Some(pattern) = catalog.lookup("IoctlParameterValue") else {
        log::debug!("Pattern 'IoctlParameterValue' not found in catalog");
        return Vec::new();
    };

    evaluate_all(text, pattern)
        .into_iter()
        .map(|values| {
            // catalogs without an id group yield name and value only
            let (id, rest) = match values.len() {
                0..=2 => (String::new(), values),
                _ => {
                    let mut values = values;
                    let id = values.remove(0);
                    (format_parameter_id(&id), values)
                }
            };
            NestedRecord::from_values(PARAMETER_FIELDS, std::iter::once(id).chain(rest))
        })
        .collect()
}

/// The `Parameter Count` text for `count` parsed parameters
pub fn parameter_count(count: usize) -> String {
    match count {
        0 => "No Parameters".to_string(),
        n => format!("{} Parameters", n),
    }
}

/// Decimal config ids are shown as 32-bit hex; anything else is flagged
fn format_parameter_id(id: &str) -> String {
    if id.is_empty() {
        return String::new();
    }
    match id.parse::<u32>() {
        Ok(value) => format!("0x{:08x}", value),
        Err(_) => format!("{} (ERROR!)", id),
    }
}
