//! Built-in catalog records for the shim's trace format
//!
//! A call block written by the shim looks like:
//!
//! ```text
//! 0.102s ++ PTOpen( "J2534", 0x00001234 )
//!   returning DeviceID: 4
//! 0.110s 0:STATUS_NOERROR
//! ```
//!
//! The status line stands alone on its line; its timestamp is optional.
//! SET_CONFIG parameters are printed as `\__ <id>:<NAME> = <value>`, the id
//! being optional.

use super::pattern::CatalogRecord;
use crate::types::CommandTag;

const DEFAULT_PATTERNS: &[(&str, &str, CommandTag)] = &[
    (
        "CommandTime",
        r"(\d+\.\d+s)\s+(?:\+\+|--|!!|\*\*|<<|>>)\s+PT *GROUPS_(1)*",
        CommandTag::None,
    ),
    (
        "CommandStatus",
        r"(?m)^[ \t]*(?:(\d+\.\d+s)[ \t]+)?(\d+:[A-Z_]+)[ \t\r]*$ *GROUPS_(2)*",
        CommandTag::None,
    ),
    (
        "PTOpen",
        r#"PTOpen\(\s*"?([^",)]*)"?,\s*([^,)\s]+)\s*\) *GROUPS_(1,2)*"#,
        CommandTag::Open,
    ),
    (
        "PTClose",
        r"PTClose\(\s*(\d+)\s*\) *GROUPS_(1)*",
        CommandTag::Close,
    ),
    (
        "PTConnect",
        concat!(
            r"PTConnect\(\s*(\d+),\s*([^,]+),\s*([^,]+),\s*([^,]+),\s*([^,)\s]+)\s*\)",
            r" *GROUPS_(1,2,3,4,5)*",
        ),
        CommandTag::Connect,
    ),
    (
        "PTDisconnect",
        r"PTDisconnect\(\s*(\d+)\s*\) *GROUPS_(1)*",
        CommandTag::Disconnect,
    ),
    (
        "PTReadMsgs",
        r"PTReadMsgs\(\s*(\d+),\s*([^,]+),\s*([^,]+),\s*(\d+)\s*\) *GROUPS_(1,2,3,4)*",
        CommandTag::ReadMessages,
    ),
    (
        "PTWriteMsgs",
        r"PTWriteMsgs\(\s*(\d+),\s*([^,]+),\s*([^,]+),\s*(\d+)\s*\) *GROUPS_(1,2,3,4)*",
        CommandTag::WriteMessages,
    ),
    (
        "PTStartMsgFilter",
        concat!(
            r"PTStartMsgFilter\(\s*(\d+),\s*([^,]+),\s*([^,]+),\s*([^,]+),\s*([^,]+),",
            r"\s*([^,)\s]+)\s*\) *GROUPS_(1,2,3,4,5,6)*",
        ),
        CommandTag::StartMsgFilter,
    ),
    (
        "PTStopMsgFilter",
        r"PTStopMsgFilter\(\s*(\d+),\s*(\d+)\s*\) *GROUPS_(1,2)*",
        CommandTag::StopMsgFilter,
    ),
    (
        "PTIoctl",
        r"PTIoctl\(\s*(\d+),\s*([^,]+),\s*([^,]+),\s*([^,)\s]+)\s*\) *GROUPS_(1,2,3,4)*",
        CommandTag::Ioctl,
    ),
    (
        "DeviceID",
        r"returning DeviceID:\s*(\d+) *GROUPS_(1)*",
        CommandTag::None,
    ),
    (
        "ChannelID",
        r"returning ChannelID:\s*(\d+) *GROUPS_(1)*",
        CommandTag::None,
    ),
    (
        "FilterID",
        r"returning FilterID:\s*(\d+) *GROUPS_(1)*",
        CommandTag::None,
    ),
    (
        "MessageCount",
        r"(?:read|sent) (\d+) of (\d+) messages *GROUPS_(1,2)*",
        CommandTag::None,
    ),
    (
        "MessageReadInfo",
        concat!(
            r"Msg\[(\d+)\]\s+(\d+\.\d+s)\.\s+(\w+)\.\s+Actual data (\d+) of \d+ bytes\.",
            r"\s+RxS=([0-9A-Fa-f]+) *GROUPS_(1,2,3,4,5)*",
        ),
        CommandTag::None,
    ),
    (
        "MessageSentInfo",
        r"Msg\[(\d+)\]\s+(\w+)\.\s+(\d+) bytes\.\s+TxF=([0-9A-Fa-f]+) *GROUPS_(1,2,3,4)*",
        CommandTag::None,
    ),
    (
        "MessageFilterInfo",
        concat!(
            r"(Mask|Pattern|FlowControl)\[\d+\]\s+(\w+)\.\s+(\d+) bytes\.",
            r"\s+TxF=([0-9A-Fa-f]+) *GROUPS_(1,2,3,4)*",
        ),
        CommandTag::None,
    ),
    (
        "IoctlParameterValue",
        concat!(
            r"(?m)^[ \t]*\\__[ \t]*(?:(\d+)[ \t]*:[ \t]*)?",
            r"([A-Za-z][A-Za-z0-9_]*)[ \t]*=[ \t]*(\S+) *GROUPS_(1,2,3)*",
        ),
        CommandTag::None,
    ),
];

/// The record set describing the shim's trace format, in lookup order
pub fn default_records() -> Vec<CatalogRecord> {
    DEFAULT_PATTERNS
        .iter()
        .map(|(name, pattern, command)| CatalogRecord::new(*name, *pattern, *command))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_names_are_unique() {
        let records = default_records();
        let names: HashSet<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.len(), records.len());
    }

    #[test]
    fn test_every_command_has_a_pattern() {
        let records = default_records();
        for tag in CommandTag::ALL.iter().filter(|t| **t != CommandTag::None) {
            assert!(
                records.iter().any(|r| r.command == *tag && r.name == tag.name()),
                "no pattern for {}",
                tag
            );
        }
    }
}
