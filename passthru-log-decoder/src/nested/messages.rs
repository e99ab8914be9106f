//! Message lists of PTReadMsgs and PTWriteMsgs blocks
//!
//! ```text
//!   read 2 of 2 messages
//!   Msg[0] 1.234567s. ISO15765. Actual data 6 of 6 bytes. RxS=00000000
//!   \__ 00 00 07 E8 50 03
//! ```

use super::collect_payload;
use crate::catalog::PatternCatalog;
use crate::extractor::{evaluate, evaluate_named};
use crate::types::NestedRecord;
use once_cell::sync::Lazy;
use regex::Regex;

static MESSAGE_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Msg\[\d+\]").expect("message header regex is valid"));

const READ_FIELDS: &[&str] = &[
    "Message Number",
    "Timestamp",
    "Protocol ID",
    "Data Count",
    "RX Flags",
    "Flag Value",
    "Message Data",
];

const WRITE_FIELDS: &[&str] = &[
    "Message Number",
    "Protocol ID",
    "Data Count",
    "TX Flags",
    "Flag Value",
    "Message Data",
];

/// Which side of the bus the messages travelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl Direction {
    fn info_pattern(&self) -> &'static str {
        match self {
            Direction::Read => "MessageReadInfo",
            Direction::Write => "MessageSentInfo",
        }
    }

    fn field_names(&self) -> &'static [&'static str] {
        match self {
            Direction::Read => READ_FIELDS,
            Direction::Write => WRITE_FIELDS,
        }
    }
}

/// Parse every message listed in a read or write block, in source order
pub fn parse_messages(
    text: &str,
    catalog: &PatternCatalog,
    direction: Direction,
) -> Vec<NestedRecord> {
    let count = evaluate_named(text, catalog, "MessageCount");
    let announced = count
        .values
        .first()
        .filter(|_| count.matched)
        .and_then(|value| value.parse::<usize>().ok());

    if announced == Some(0) {
        return Vec::new();
    }

    let Some(info) = catalog.lookup(direction.info_pattern()) else {
        log::debug!("Pattern '{}' not found in catalog", direction.info_pattern());
        return Vec::new();
    };

    let mut records = Vec::new();
    for chunk in message_chunks(text) {
        let extraction = evaluate(chunk, info);
        if !extraction.matched {
            log::debug!("Skipping unparsable message entry: {}", chunk.trim());
            continue;
        }

        // RxS/TxF is the last value the info pattern selects
        let mut values = extraction.values;
        let flags = flag_value(values.last().map(String::as_str).unwrap_or_default());
        values.push(flags);
        values.push(collect_payload(chunk));
        records.push(NestedRecord::from_values(direction.field_names(), values));
    }

    if let Some(expected) = announced {
        if expected != records.len() {
            log::debug!(
                "Message count header announced {} messages, parsed {}",
                expected,
                records.len()
            );
        }
    }

    records
}

/// Display form of a message's status or transmit flags
fn flag_value(flags: &str) -> String {
    if flags.is_empty() || flags.chars().all(|c| c == '0') {
        "No Flag Value".to_string()
    } else {
        format!("0x{}", flags.to_uppercase())
    }
}

/// Slices of `text` starting at each `Msg[n]` header
fn message_chunks(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = MESSAGE_HEADER.find_iter(text).map(|m| m.start()).collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect()
}
