//! Plain-text rendering of expressions
//!
//! Pure string builders; callers decide where the text goes.

use crate::expression::Expression;
use crate::types::{NestedContent, NestedRecord};

const RULE_WIDTH: usize = 100;
const TRUNCATE_AT: usize = 60;
const TRUNCATED_KEEP: usize = 49;

/// Render headers and rows as an ASCII table
///
/// Rows shorter than the header are padded with empty cells.
pub fn text_table<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> String {
    let columns = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let format_row = |cells: Vec<&str>| {
        let mut line = String::from("|");
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).copied().unwrap_or("");
            line.push_str(&format!(" {:<width$} |", cell, width = width));
        }
        line
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(border.clone());
    out.push(format_row(headers.iter().map(|h| h.as_ref()).collect()));
    out.push(border.clone());
    for row in rows {
        out.push(format_row(row.iter().take(columns).map(String::as_str).collect()));
    }
    out.push(border);
    out.join("\n")
}

/// Cut long values so tables stay readable
pub fn truncate_value(value: &str) -> String {
    if value.chars().count() >= TRUNCATE_AT {
        let kept: String = value.chars().take(TRUNCATED_KEEP).collect();
        format!("{} (Truncated)", kept)
    } else {
        value.to_string()
    }
}

/// Render one expression: its raw lines, its field table and nested tables
pub fn expression_table(expression: &Expression) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&rule);
    out.push('\n');
    for line in expression.lines() {
        out.push_str("   ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');

    let headers = [
        "J2534 Command",
        expression.command().name(),
        if expression.passed() { "Parse Passed" } else { "Parse Failed" },
    ];
    let rows: Vec<Vec<String>> = expression
        .fields()
        .iter()
        .map(|field| {
            vec![
                field.name().to_string(),
                truncate_value(field.display()),
                field.verdict().to_string(),
            ]
        })
        .collect();
    out.push_str(&text_table(&headers, &rows));
    out.push('\n');

    match expression.nested() {
        NestedContent::None => {}
        NestedContent::Messages(records) if records.is_empty() => {
            out.push_str("No Messages Found!\n");
        }
        NestedContent::Ioctl(records) if records.is_empty() => {
            out.push_str("No IOCTL Parameters Found!\n");
        }
        nested => {
            out.push_str(&records_table(nested.records()));
            out.push('\n');
        }
    }

    out
}

/// One table for a list of nested records, columns taken from the first record
fn records_table(records: &[NestedRecord]) -> String {
    let headers: Vec<&str> = records
        .first()
        .map(|record| record.iter().map(|(name, _)| name).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| record.iter().map(|(_, value)| truncate_value(value)).collect())
        .collect();
    text_table(&headers, &rows)
}
