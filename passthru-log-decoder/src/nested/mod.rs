//! Parsers for repeating content inside a command block
//!
//! These run after field assignment and re-scan the same raw block text:
//! - Message lists of PTReadMsgs / PTWriteMsgs
//! - Mask, Pattern and FlowControl parts of PTStartMsgFilter
//! - Parameter lists of PTIoctl

pub mod filter;
pub mod ioctl;
pub mod messages;

use crate::catalog::PatternCatalog;
use crate::types::{FieldValue, NestedContent};
use crate::variants::NestedKind;

/// Parse the nested content a variant declares
pub(crate) fn parse(
    kind: NestedKind,
    text: &str,
    fields: &[FieldValue],
    catalog: &PatternCatalog,
) -> NestedContent {
    match kind {
        NestedKind::None => NestedContent::None,
        NestedKind::ReadMessages => NestedContent::Messages(messages::parse_messages(
            text,
            catalog,
            messages::Direction::Read,
        )),
        NestedKind::WriteMessages => NestedContent::Messages(messages::parse_messages(
            text,
            catalog,
            messages::Direction::Write,
        )),
        NestedKind::Filter => NestedContent::Filter(filter::parse_filter(text, fields, catalog)),
        NestedKind::Ioctl => NestedContent::Ioctl(ioctl::parse_parameters(text, catalog)),
    }
}

/// Collect the payload bytes printed on `\__` lines as `0xNN` tokens
///
/// Hex digits are taken from every whitespace-separated token that is pure
/// hex, so both `00 07 E8` and `0007E8` come out the same.
pub(crate) fn collect_payload(text: &str) -> String {
    let digits: String = text
        .lines()
        .filter_map(|line| line.split_once(r"\__").map(|(_, rest)| rest))
        .flat_map(str::split_whitespace)
        .filter(|token| token.chars().all(|c| c.is_ascii_hexdigit()))
        .collect::<String>()
        .to_uppercase();

    let chars: Vec<char> = digits.chars().collect();
    chars
        .chunks(2)
        .map(|pair| format!("0x{}", pair.iter().collect::<String>()))
        .collect::<Vec<_>>()
        .join(" ")
}
