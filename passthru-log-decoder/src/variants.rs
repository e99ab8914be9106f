//! Per-command field tables
//!
//! Each command variant declares, statically, the fields it carries after the
//! two base fields and the extraction steps that feed them. Step output is
//! concatenated in order and assigned to the fields positionally, so the two
//! lists must line up.

use crate::types::{CommandTag, FieldDescriptor, MISSING_ID, STATUS_NOERROR};

/// One extraction step of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The whole match of the named pattern, as one value
    Whole(&'static str),
    /// The selected capture groups of the named pattern
    Groups(&'static str),
    /// How many IOCTL parameters the block lists, as one value
    ParameterCount,
}

/// Nested content a variant carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestedKind {
    None,
    ReadMessages,
    WriteMessages,
    Filter,
    Ioctl,
}

/// Static description of one command variant
#[derive(Debug)]
pub struct VariantDefinition {
    pub command: CommandTag,
    /// Fields declared after the base fields, in table order
    pub fields: &'static [FieldDescriptor],
    pub steps: &'static [Step],
    pub nested: NestedKind,
}

impl VariantDefinition {
    /// Number of values a successful construction produces
    pub fn declared_len(&self) -> usize {
        BASE_FIELDS.len() + self.fields.len()
    }

    /// Base fields followed by variant fields
    pub fn all_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        BASE_FIELDS.iter().chain(self.fields.iter())
    }
}

/// Catalog name of the command-time pattern
pub const TIME_PATTERN: &str = "CommandTime";
/// Catalog name of the status-line pattern
pub const STATUS_PATTERN: &str = "CommandStatus";

/// Fields every expression starts with
pub const BASE_FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor::new("Time Issued", TIME_PATTERN)
        .labels("Timestamp Valid", "Invalid Timestamp"),
    FieldDescriptor::new("J2534 Status", STATUS_PATTERN)
        .expecting(STATUS_NOERROR)
        .labels("Command Passed", "Command Failed"),
];

const DEVICE_ID_RETURNED: FieldDescriptor = FieldDescriptor::new("Device ID", "DeviceID")
    .labels("Device Opened", "Invalid Device ID!")
    .fallback(MISSING_ID);

const CHANNEL_ID_RETURNED: FieldDescriptor = FieldDescriptor::new("Channel ID", "ChannelID")
    .labels("Channel Opened", "Invalid Channel!")
    .fallback(MISSING_ID);

const FILTER_ID_RETURNED: FieldDescriptor = FieldDescriptor::new("Filter ID", "FilterID")
    .labels("Filter Started", "Invalid Filter!")
    .fallback(MISSING_ID);

static NONE: VariantDefinition = VariantDefinition {
    command: CommandTag::None,
    fields: &[],
    steps: &[],
    nested: NestedKind::None,
};

static OPEN: VariantDefinition = VariantDefinition {
    command: CommandTag::Open,
    fields: &[
        FieldDescriptor::new("Command Line", "PTOpen"),
        FieldDescriptor::new("Device Name", "PTOpen"),
        FieldDescriptor::new("Device Pointer", "PTOpen"),
        DEVICE_ID_RETURNED,
    ],
    steps: &[Step::Whole("PTOpen"), Step::Groups("PTOpen"), Step::Groups("DeviceID")],
    nested: NestedKind::None,
};

static CLOSE: VariantDefinition = VariantDefinition {
    command: CommandTag::Close,
    fields: &[
        FieldDescriptor::new("Command Line", "PTClose"),
        FieldDescriptor::new("Device ID", "PTClose"),
    ],
    steps: &[Step::Whole("PTClose"), Step::Groups("PTClose")],
    nested: NestedKind::None,
};

static CONNECT: VariantDefinition = VariantDefinition {
    command: CommandTag::Connect,
    fields: &[
        FieldDescriptor::new("Command Line", "PTConnect"),
        FieldDescriptor::new("Device ID", "PTConnect"),
        FieldDescriptor::new("Protocol ID", "PTConnect"),
        FieldDescriptor::new("Connect Flags", "PTConnect"),
        FieldDescriptor::new("Baud Rate", "PTConnect"),
        FieldDescriptor::new("Channel Pointer", "PTConnect"),
        CHANNEL_ID_RETURNED,
    ],
    steps: &[
        Step::Whole("PTConnect"),
        Step::Groups("PTConnect"),
        Step::Groups("ChannelID"),
    ],
    nested: NestedKind::None,
};

static DISCONNECT: VariantDefinition = VariantDefinition {
    command: CommandTag::Disconnect,
    fields: &[
        FieldDescriptor::new("Command Line", "PTDisconnect"),
        FieldDescriptor::new("Channel ID", "PTDisconnect"),
    ],
    steps: &[Step::Whole("PTDisconnect"), Step::Groups("PTDisconnect")],
    nested: NestedKind::None,
};

static READ_MESSAGES: VariantDefinition = VariantDefinition {
    command: CommandTag::ReadMessages,
    fields: &[
        FieldDescriptor::new("Command Line", "PTReadMsgs"),
        FieldDescriptor::new("Channel ID", "PTReadMsgs"),
        FieldDescriptor::new("Message Pointer", "PTReadMsgs"),
        FieldDescriptor::new("Count Pointer", "PTReadMsgs"),
        FieldDescriptor::new("Timeout", "PTReadMsgs"),
        FieldDescriptor::new("Messages Read", "MessageCount"),
        FieldDescriptor::new("Messages Expected", "MessageCount"),
    ],
    steps: &[
        Step::Whole("PTReadMsgs"),
        Step::Groups("PTReadMsgs"),
        Step::Groups("MessageCount"),
    ],
    nested: NestedKind::ReadMessages,
};

static WRITE_MESSAGES: VariantDefinition = VariantDefinition {
    command: CommandTag::WriteMessages,
    fields: &[
        FieldDescriptor::new("Command Line", "PTWriteMsgs"),
        FieldDescriptor::new("Channel ID", "PTWriteMsgs"),
        FieldDescriptor::new("Message Pointer", "PTWriteMsgs"),
        FieldDescriptor::new("Count Pointer", "PTWriteMsgs"),
        FieldDescriptor::new("Timeout", "PTWriteMsgs"),
        FieldDescriptor::new("Messages Sent", "MessageCount"),
        FieldDescriptor::new("Messages Expected", "MessageCount"),
    ],
    steps: &[
        Step::Whole("PTWriteMsgs"),
        Step::Groups("PTWriteMsgs"),
        Step::Groups("MessageCount"),
    ],
    nested: NestedKind::WriteMessages,
};

static START_MSG_FILTER: VariantDefinition = VariantDefinition {
    command: CommandTag::StartMsgFilter,
    fields: &[
        FieldDescriptor::new("Command Line", "PTStartMsgFilter"),
        FieldDescriptor::new("Channel ID", "PTStartMsgFilter"),
        FieldDescriptor::new("Filter Type", "PTStartMsgFilter"),
        FieldDescriptor::new("Mask Pointer", "PTStartMsgFilter"),
        FieldDescriptor::new("Pattern Pointer", "PTStartMsgFilter"),
        FieldDescriptor::new("Flow Control Pointer", "PTStartMsgFilter"),
        FieldDescriptor::new("Filter Pointer", "PTStartMsgFilter"),
        FILTER_ID_RETURNED,
    ],
    steps: &[
        Step::Whole("PTStartMsgFilter"),
        Step::Groups("PTStartMsgFilter"),
        Step::Groups("FilterID"),
    ],
    nested: NestedKind::Filter,
};

static STOP_MSG_FILTER: VariantDefinition = VariantDefinition {
    command: CommandTag::StopMsgFilter,
    fields: &[
        FieldDescriptor::new("Command Line", "PTStopMsgFilter"),
        FieldDescriptor::new("Channel ID", "PTStopMsgFilter"),
        FieldDescriptor::new("Filter ID", "PTStopMsgFilter"),
    ],
    steps: &[Step::Whole("PTStopMsgFilter"), Step::Groups("PTStopMsgFilter")],
    nested: NestedKind::None,
};

static IOCTL: VariantDefinition = VariantDefinition {
    command: CommandTag::Ioctl,
    fields: &[
        FieldDescriptor::new("Command Line", "PTIoctl"),
        FieldDescriptor::new("Channel ID", "PTIoctl"),
        FieldDescriptor::new("IOCTL Type", "PTIoctl"),
        FieldDescriptor::new("Input Pointer", "PTIoctl"),
        FieldDescriptor::new("Output Pointer", "PTIoctl"),
        FieldDescriptor::new("Parameter Count", "IoctlParameterValue"),
    ],
    steps: &[
        Step::Whole("PTIoctl"),
        Step::Groups("PTIoctl"),
        Step::ParameterCount,
    ],
    nested: NestedKind::Ioctl,
};

impl CommandTag {
    /// Declared field table and extraction steps for this command
    pub fn definition(&self) -> &'static VariantDefinition {
        match self {
            CommandTag::None => &NONE,
            CommandTag::Open => &OPEN,
            CommandTag::Close => &CLOSE,
            CommandTag::Connect => &CONNECT,
            CommandTag::Disconnect => &DISCONNECT,
            CommandTag::ReadMessages => &READ_MESSAGES,
            CommandTag::WriteMessages => &WRITE_MESSAGES,
            CommandTag::StartMsgFilter => &START_MSG_FILTER,
            CommandTag::StopMsgFilter => &STOP_MSG_FILTER,
            CommandTag::Ioctl => &IOCTL,
        }
    }
}
