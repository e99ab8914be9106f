// End-to-end parsing of shim traces through the public API
use passthru_log_decoder::{
    CatalogRecord, CommandTag, DecoderError, Expression, LogParser, NestedContent, ParserConfig,
    PatternCatalog,
};

const SAMPLE_TRACE: &str = include_str!("data/sample_trace.txt");

fn catalog() -> PatternCatalog {
    let _ = env_logger::builder().is_test(true).try_init();
    PatternCatalog::builtin().unwrap()
}

#[test]
fn open_with_device_id_passes() {
    let text = "0.102s ++ PTOpen( \"J2534\", 0x00001234 )\n\
                \x20 returning DeviceID: 4\n\
                0.110s 0:STATUS_NOERROR\n";
    let expression = Expression::parse(text, &catalog()).unwrap();

    assert_eq!(expression.command(), CommandTag::Open);
    assert_eq!(expression.value("Device Name"), Some("J2534"));
    assert_eq!(expression.value("Device Pointer"), Some("0x00001234"));
    assert_eq!(expression.value("Device ID"), Some("4"));
    assert!(expression.passed());
}

#[test]
fn open_without_device_id_fails() {
    let text = "0.102s ++ PTOpen( \"J2534\", 0x00001234 )\n0.110s 0:STATUS_NOERROR\n";
    let expression = Expression::parse(text, &catalog()).unwrap();

    let device_id = expression.field("Device ID").unwrap();
    assert_eq!(device_id.value(), None);
    assert_eq!(device_id.display(), "-1");
    assert_eq!(device_id.verdict(), "Invalid Device ID!");
    assert!(!expression.passed());
}

#[test]
fn connect_without_channel_id_is_still_returned() {
    let text = "0.150s ++ PTConnect(1, ISO15765, 0x00000000, 500000, 0x0012FE00)\n\
                0.161s 0:STATUS_NOERROR\n";
    let catalog = catalog();
    let parser = LogParser::new(&catalog, ParserConfig::new());
    let report = parser.parse_log(text).unwrap();

    assert!(report.failures.is_empty());
    let connect = &report.expressions[0];
    assert_eq!(connect.command(), CommandTag::Connect);
    assert_eq!(connect.value("Baud Rate"), Some("500000"));
    assert_eq!(connect.value("Channel ID"), Some("-1"));
    assert!(!connect.field("Channel ID").unwrap().passed());
    assert!(!connect.passed());
}

#[test]
fn ioctl_parameters_in_source_order() {
    let text = "0.170s ** PTIoctl(2, SET_CONFIG, 0x0012FD00, 0x00000000)\n\
                \x20 \t\\__ 1:DATA_RATE = 500000\n\
                \x20 \t\\__ 3:LOOPBACK = 0\n\
                \x20 \t\\__ 23:BIT_SAMPLE_POINT = 80\n\
                0.171s 0:STATUS_NOERROR\n";
    let expression = Expression::parse(text, &catalog()).unwrap();
    assert_eq!(expression.value("Parameter Count"), Some("3 Parameters"));

    let NestedContent::Ioctl(parameters) = expression.nested() else {
        panic!("expected IOCTL parameters, got {:?}", expression.nested());
    };
    let names: Vec<_> = parameters
        .iter()
        .map(|p| p.get("Parameter Name").unwrap())
        .collect();
    assert_eq!(names, vec!["DATA_RATE", "LOOPBACK", "BIT_SAMPLE_POINT"]);
    assert_eq!(parameters[2].get("Parameter Value"), Some("80"));
    assert_eq!(parameters[2].get("Parameter ID"), Some("0x00000017"));
}

#[test]
fn group_marker_is_stripped_on_load() {
    let records = vec![CatalogRecord::new("Foo", "Foo *GROUPS_(1,3)*", CommandTag::None)];
    let catalog = PatternCatalog::load(&records).unwrap();
    let foo = catalog.lookup("foo").unwrap();
    assert_eq!(foo.pattern(), "Foo");
    assert_eq!(foo.selectors(), &[1, 3]);
}

#[test]
fn truncated_block_is_an_arity_mismatch() {
    let text = "0.180s ** PTStartMsgFilter(2, PASS_FILTER, 0x0012FC00\n";
    let err = Expression::parse(text, &catalog()).unwrap_err();
    assert!(matches!(
        err,
        DecoderError::FieldArityMismatch {
            command: CommandTag::StartMsgFilter,
            ..
        }
    ));
}

#[test]
fn separated_blocks_parse_in_order() {
    let blocks = [
        "0.1s ++ PTOpen(, 0x0012FE1C)\n  returning DeviceID: 1\n0.2s 0:STATUS_NOERROR",
        "0.3s -- PTDisconnect(2)\n0.4s 0:STATUS_NOERROR",
        "0.5s ** PTStopMsgFilter(2, 0)\n0.6s 0:STATUS_NOERROR",
        "0.7s -- PTClose(1)\n0.8s 0:STATUS_NOERROR",
    ];
    let joined = blocks.join("\u{1e}");

    let catalog = catalog();
    let parser = LogParser::new(&catalog, ParserConfig::new().with_separator('\u{1e}'));
    let report = parser.parse_log(&joined).unwrap();

    let commands: Vec<_> = report.expressions.iter().map(|e| e.command()).collect();
    assert_eq!(
        commands,
        vec![
            CommandTag::Open,
            CommandTag::Disconnect,
            CommandTag::StopMsgFilter,
            CommandTag::Close,
        ]
    );
    assert_eq!(report.expressions[0].raw_text(), blocks[0]);
}

#[test]
fn parsing_is_idempotent() {
    let catalog = catalog();
    let parser = LogParser::new(&catalog, ParserConfig::new());
    let first = parser.parse_log(SAMPLE_TRACE).unwrap();
    let second = parser.parse_log(SAMPLE_TRACE).unwrap();
    assert_eq!(first.expressions, second.expressions);
}

#[test]
fn sample_trace_parses_completely() {
    let catalog = catalog();
    let parser = LogParser::new(&catalog, ParserConfig::new().with_worker_threads(3));
    let report = parser.parse_log(SAMPLE_TRACE).unwrap();

    // leading banner becomes its own NONE block
    assert_eq!(report.total_blocks, 10);
    assert!(report.failures.is_empty());

    let commands: Vec<_> = report.expressions.iter().map(|e| e.command()).collect();
    assert_eq!(
        commands,
        vec![
            CommandTag::None,
            CommandTag::Open,
            CommandTag::Connect,
            CommandTag::Ioctl,
            CommandTag::StartMsgFilter,
            CommandTag::WriteMessages,
            CommandTag::ReadMessages,
            CommandTag::StopMsgFilter,
            CommandTag::Disconnect,
            CommandTag::Close,
        ]
    );
    assert!(report.expressions[1..].iter().all(Expression::passed));

    let read = &report.expressions[6];
    assert_eq!(read.value("Messages Read"), Some("2"));
    assert_eq!(read.value("Timeout"), Some("250"));
    assert_eq!(read.nested().records().len(), 2);
    assert_eq!(
        read.nested().records()[1].get("Message Data"),
        Some("0x00 0x00 0x07 0xE8 0x50 0x03 0x00 0x32")
    );

    assert_eq!(read.nested().records()[0].get("Flag Value"), Some("0x00000009"));
    assert_eq!(read.nested().records()[1].get("Flag Value"), Some("No Flag Value"));

    let ioctl = &report.expressions[3];
    assert_eq!(ioctl.value("Parameter Count"), Some("3 Parameters"));
    assert_eq!(ioctl.nested().records()[0].get("Parameter ID"), Some("0x00000001"));

    let filter = &report.expressions[4];
    assert_eq!(filter.value("Filter ID"), Some("0"));
    assert_eq!(filter.nested().records()[2].get("Pointer"), Some("0x0012FC20"));

    let summary = report.summary();
    assert_eq!(summary.parsed, 10);
    assert_eq!(summary.passed, 9);
    assert_eq!(summary.failed, 1);
}
