//! Filter descriptors of PTStartMsgFilter blocks
//!
//! A filter always carries three parts. The FlowControl part may be printed
//! as `FlowControl is NULL`, in which case its record stays empty.

use super::collect_payload;
use crate::catalog::PatternCatalog;
use crate::extractor::evaluate;
use crate::types::{FieldValue, NestedRecord};
use once_cell::sync::Lazy;
use regex::Regex;

static PART_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(Mask|Pattern|FlowControl)(?:\[\d+\]| is NULL)")
        .expect("filter part regex is valid")
});

const FILTER_FIELDS: &[&str] = &[
    "Message Type",
    "Pointer",
    "Protocol ID",
    "Data Count",
    "TX Flags",
    "Message Data",
];

/// Part name and the command field holding its pointer
const PARTS: [(&str, &str); 3] = [
    ("Mask", "Mask Pointer"),
    ("Pattern", "Pattern Pointer"),
    ("FlowControl", "Flow Control Pointer"),
];

/// Parse the Mask, Pattern and FlowControl records, in that order
pub fn parse_filter(
    text: &str,
    fields: &[FieldValue],
    catalog: &PatternCatalog,
) -> Vec<NestedRecord> {
    let info = catalog.lookup("MessageFilterInfo");
    if info.is_none() {
        log::debug!("Pattern 'MessageFilterInfo' not found in catalog");
    }

    let chunks = part_chunks(text);

    PARTS
        .iter()
        .map(|(part, pointer_field)| {
            let pointer = fields
                .iter()
                .find(|field| field.name() == *pointer_field)
                .and_then(FieldValue::value)
                .unwrap_or_default()
                .to_string();

            let parsed = info.and_then(|info| {
                chunks
                    .iter()
                    .filter(|(name, _)| name == part)
                    .map(|(_, chunk)| (evaluate(chunk, info), *chunk))
                    .find(|(extraction, _)| extraction.matched)
            });

            let mut values = vec![part.to_string(), pointer];
            match parsed {
                Some((extraction, chunk)) => {
                    // the info pattern repeats the part name first
                    values.extend(extraction.values.into_iter().skip(1));
                    values.push(collect_payload(chunk));
                }
                None => values.extend(std::iter::repeat(String::new()).take(4)),
            }

            values.resize(FILTER_FIELDS.len(), String::new());
            NestedRecord::from_values(FILTER_FIELDS, values)
        })
        .collect()
}

/// Slices of `text` starting at each part header, tagged with the part name
fn part_chunks(text: &str) -> Vec<(String, &str)> {
    let headers: Vec<(usize, String)> = PART_HEADER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some((whole.start(), name.as_str().to_string()))
        })
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, (start, name))| {
            let end = headers.get(i + 1).map_or(text.len(), |(next, _)| *next);
            (name.clone(), &text[*start..end])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDescriptor;

    const FILTER_BLOCK: &str = "0.150s ** PTStartMsgFilter(1, FLOW_CONTROL_FILTER, \
                                0x0012FE00, 0x0012FE10, 0x0012FE20, 0x0012FE30)\n\
                                \x20 Mask[0] ISO15765. 4 bytes. TxF=00000040\n\
                                \x20 \\__ FF FF FF FF\n\
                                \x20 Pattern[0] ISO15765. 4 bytes. TxF=00000040\n\
                                \x20 \\__ 00 00 07 E8\n\
                                \x20 FlowControl[0] ISO15765. 4 bytes. TxF=00000040\n\
                                \x20 \\__ 00 00 07 E0\n\
                                \x20 returning FilterID: 0\n\
                                0.151s 0:STATUS_NOERROR\n";

    fn pointer_fields() -> Vec<FieldValue> {
        vec![
            FieldValue::new(FieldDescriptor::new("Mask Pointer", "x"), Some("0x0012FE00".into())),
            FieldValue::new(
                FieldDescriptor::new("Pattern Pointer", "x"),
                Some("0x0012FE10".into()),
            ),
            FieldValue::new(FieldDescriptor::new("Flow Control Pointer", "x"), None),
        ]
    }

    #[test]
    fn test_three_parts_in_order() {
        let catalog = PatternCatalog::builtin().unwrap();
        let records = parse_filter(FILTER_BLOCK, &pointer_fields(), &catalog);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("Message Type"), Some("Mask"));
        assert_eq!(records[0].get("Pointer"), Some("0x0012FE00"));
        assert_eq!(records[0].get("Message Data"), Some("0xFF 0xFF 0xFF 0xFF"));
        assert_eq!(records[1].get("Protocol ID"), Some("ISO15765"));
        assert_eq!(records[1].get("Data Count"), Some("4"));
        assert_eq!(records[2].get("TX Flags"), Some("00000040"));
        assert_eq!(records[2].get("Message Data"), Some("0x00 0x00 0x07 0xE0"));
        assert_eq!(records[2].get("Pointer"), Some(""));
    }

    #[test]
    fn test_null_flow_control_is_empty() {
        let block = "0.150s ** PTStartMsgFilter(1, PASS_FILTER, \
                     0x0012FE00, 0x0012FE10, 0x00000000, 0x0012FE30)\n\
                     \x20 Mask[0] ISO15765. 4 bytes. TxF=00000040\n\
                     \x20 \\__ FF FF FF FF\n\
                     \x20 Pattern[0] ISO15765. 4 bytes. TxF=00000040\n\
                     \x20 \\__ 00 00 07 E8\n\
                     \x20 FlowControl is NULL\n\
                     \x20 returning FilterID: 1\n\
                     0.151s 0:STATUS_NOERROR\n";
        let catalog = PatternCatalog::builtin().unwrap();
        let records = parse_filter(block, &[], &catalog);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].get("Message Data"), Some("0x00 0x00 0x07 0xE8"));
        assert_eq!(records[2].get("Message Type"), Some("FlowControl"));
        assert_eq!(records[2].get("Protocol ID"), Some(""));
        assert_eq!(records[2].get("Message Data"), Some(""));
    }
}
