//! Core types for the PassThru log decoder library
//!
//! This module defines the fundamental types the decoder emits when processing
//! trace text: command tags, field descriptors and values, nested records and
//! the library error type. Everything here is plain data; the parsing logic
//! lives in the catalog, extractor and expression modules.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Placeholder shown for a field whose pattern did not match
pub const REGEX_FAILED: &str = "REGEX_FAILED";

/// Placeholder shown for a driver-returned identifier that was never echoed
pub const MISSING_ID: &str = "-1";

/// Status string the driver prints for a successful call
pub const STATUS_NOERROR: &str = "0:STATUS_NOERROR";

/// Errors that can occur during decoding
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecoderError {
    #[error("Pattern catalog is empty: no usable pattern definitions were loaded")]
    EmptyCatalog,

    #[error("Invalid pattern '{name}': {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error(
        "Field arity mismatch for {command}: {expected} fields declared, {found} values extracted"
    )]
    FieldArityMismatch {
        command: CommandTag,
        expected: usize,
        found: usize,
    },

    #[error("Invalid decoder configuration: {0}")]
    InvalidConfig(String),
}

/// The closed set of PassThru commands the decoder knows how to parse
///
/// Serialized names match the command tags used by pattern catalog records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum CommandTag {
    #[default]
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "PTOpen")]
    Open,
    #[serde(rename = "PTClose")]
    Close,
    #[serde(rename = "PTConnect")]
    Connect,
    #[serde(rename = "PTDisconnect")]
    Disconnect,
    #[serde(rename = "PTReadMsgs")]
    ReadMessages,
    #[serde(rename = "PTWriteMsgs")]
    WriteMessages,
    #[serde(rename = "PTStartMsgFilter")]
    StartMsgFilter,
    #[serde(rename = "PTStopMsgFilter")]
    StopMsgFilter,
    #[serde(rename = "PTIoctl")]
    Ioctl,
}

impl CommandTag {
    /// Every tag, in classification order
    pub const ALL: [CommandTag; 10] = [
        CommandTag::None,
        CommandTag::Open,
        CommandTag::Close,
        CommandTag::Connect,
        CommandTag::Disconnect,
        CommandTag::ReadMessages,
        CommandTag::WriteMessages,
        CommandTag::StartMsgFilter,
        CommandTag::StopMsgFilter,
        CommandTag::Ioctl,
    ];

    /// Name of the command as it appears in the trace
    pub fn name(&self) -> &'static str {
        match self {
            CommandTag::None => "NONE",
            CommandTag::Open => "PTOpen",
            CommandTag::Close => "PTClose",
            CommandTag::Connect => "PTConnect",
            CommandTag::Disconnect => "PTDisconnect",
            CommandTag::ReadMessages => "PTReadMsgs",
            CommandTag::WriteMessages => "PTWriteMsgs",
            CommandTag::StartMsgFilter => "PTStartMsgFilter",
            CommandTag::StopMsgFilter => "PTStopMsgFilter",
            CommandTag::Ioctl => "PTIoctl",
        }
    }

    /// Keyword that identifies this command inside a block (`None` has none)
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            CommandTag::None => None,
            CommandTag::Open => Some("PTOpen("),
            CommandTag::Close => Some("PTClose("),
            CommandTag::Connect => Some("PTConnect("),
            CommandTag::Disconnect => Some("PTDisconnect("),
            CommandTag::ReadMessages => Some("PTReadMsgs("),
            CommandTag::WriteMessages => Some("PTWriteMsgs("),
            CommandTag::StartMsgFilter => Some("PTStartMsgFilter("),
            CommandTag::StopMsgFilter => Some("PTStopMsgFilter("),
            CommandTag::Ioctl => Some("PTIoctl("),
        }
    }

    /// Classify a block of trace text by the first command keyword it contains
    ///
    /// Unknown commands map to `None` so new driver calls pass through as
    /// minimal time/status records instead of errors.
    pub fn classify(text: &str) -> CommandTag {
        CommandTag::ALL
            .iter()
            .copied()
            .find(|tag| tag.keyword().is_some_and(|keyword| text.contains(keyword)))
            .unwrap_or(CommandTag::None)
    }
}

impl fmt::Display for CommandTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Declared metadata for one field of an expression variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name shown in tables and used for lookups
    pub name: &'static str,
    /// Required value; empty means any extracted value passes
    pub expected: &'static str,
    /// Verdict text when the field passes
    pub pass_label: &'static str,
    /// Verdict text when the field fails
    pub fail_label: &'static str,
    /// Text displayed when extraction failed
    pub fallback: &'static str,
    /// Catalog name of the pattern feeding this field
    pub pattern: &'static str,
}

impl FieldDescriptor {
    /// A field fed by `pattern` that accepts any extracted value
    pub const fn new(name: &'static str, pattern: &'static str) -> Self {
        Self {
            name,
            expected: "",
            pass_label: "Value Validated",
            fail_label: "Value Was Invalid!",
            fallback: REGEX_FAILED,
            pattern,
        }
    }

    /// Builder method: require an exact value
    pub const fn expecting(self, expected: &'static str) -> Self {
        Self { expected, ..self }
    }

    /// Builder method: set the pass/fail verdict labels
    pub const fn labels(self, pass_label: &'static str, fail_label: &'static str) -> Self {
        Self {
            pass_label,
            fail_label,
            ..self
        }
    }

    /// Builder method: set the displayed fallback
    pub const fn fallback(self, fallback: &'static str) -> Self {
        Self { fallback, ..self }
    }

    /// Check whether an extracted value satisfies this field
    pub fn passes(&self, value: Option<&str>) -> bool {
        match value {
            Some(value) => self.expected.is_empty() || value.trim() == self.expected,
            None => false,
        }
    }

    /// Verdict label for an extracted value
    pub fn verdict(&self, value: Option<&str>) -> &'static str {
        if self.passes(value) {
            self.pass_label
        } else {
            self.fail_label
        }
    }
}

/// One assigned field of an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    descriptor: FieldDescriptor,
    value: Option<String>,
}

impl FieldValue {
    /// Pair a descriptor with its extracted value
    pub fn new(descriptor: FieldDescriptor, value: Option<String>) -> Self {
        Self { descriptor, value }
    }

    /// Declared metadata of this field
    pub fn descriptor(&self) -> &FieldDescriptor {
        &self.descriptor
    }

    /// Field name as shown in tables
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// The extracted value, `None` when extraction failed
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// The value as users see it: extracted text or the declared fallback
    pub fn display(&self) -> &str {
        self.value.as_deref().unwrap_or(self.descriptor.fallback)
    }

    /// Whether the extracted value satisfies the descriptor
    pub fn passed(&self) -> bool {
        self.descriptor.passes(self.value())
    }

    /// Pass or fail label for the extracted value
    pub fn verdict(&self) -> &'static str {
        self.descriptor.verdict(self.value())
    }
}

/// One repeating element embedded in a command block
///
/// A message, a filter component or an IOCTL parameter, stored as ordered
/// name/value pairs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NestedRecord {
    values: Vec<(String, String)>,
}

impl NestedRecord {
    /// Pair `names` with `values` positionally; extra entries on either side are dropped
    pub fn from_values<I>(names: &[&str], values: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            values: names
                .iter()
                .map(|name| name.to_string())
                .zip(values)
                .collect(),
        }
    }

    /// Get a value by its name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Name/value pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Variant-specific nested content of an expression
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NestedContent {
    #[default]
    None,
    /// Messages read or written, in source order
    Messages(Vec<NestedRecord>),
    /// Mask, Pattern and FlowControl components, always three
    Filter(Vec<NestedRecord>),
    /// IOCTL configuration parameters, in source order
    Ioctl(Vec<NestedRecord>),
}

impl NestedContent {
    /// The nested records regardless of kind
    pub fn records(&self) -> &[NestedRecord] {
        match self {
            NestedContent::None => &[],
            NestedContent::Messages(records)
            | NestedContent::Filter(records)
            | NestedContent::Ioctl(records) => records,
        }
    }
}
