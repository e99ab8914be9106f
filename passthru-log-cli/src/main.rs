//! PassThru Log Reader CLI Application
//!
//! This is the command-line interface for the PassThru trace parser.
//! It uses the passthru-log-decoder library and adds:
//! - Reading trace files from disk
//! - TOML configuration (parser settings, custom pattern catalogs)
//! - Report generation (TXT/JSON)

use anyhow::{bail, Context, Result};
use clap::Parser;
use passthru_log_decoder::LogParser;
use std::fs;
use std::path::PathBuf;

mod config;
mod report;

use config::{AppConfig, OutputFormat};

/// PassThru Log Reader - Parse J2534 shim call traces
#[derive(Parser, Debug)]
#[command(name = "ptlog")]
#[command(about = "Parse PassThru (J2534) shim traces into command tables", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the shim trace file to parse
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Parse blocks one at a time instead of on a worker pool
    #[arg(long)]
    sequential: bool,

    /// Number of worker threads for parallel parsing
    #[arg(long, value_name = "COUNT")]
    threads: Option<usize>,

    /// Maximum number of command blocks to parse (for testing)
    #[arg(long, value_name = "COUNT")]
    max_blocks: Option<usize>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("PassThru Log Reader CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", passthru_log_decoder::VERSION);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let Some(log_path) = args.log.clone().or_else(|| config.input.log.clone()) else {
        println!("PassThru Log Reader - No input specified");
        println!("\nQuick Start:");
        println!("  ptlog --log trace.txt");
        println!("  ptlog --log trace.txt --format json --output report.json");
        println!("\nWith a configuration file:");
        println!("  ptlog --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    };

    run(&args, config, log_path)
}

/// Parse one trace file and write its report
fn run(args: &Args, mut config: AppConfig, log_path: PathBuf) -> Result<()> {
    // command-line flags override the configuration file
    if args.sequential {
        config.parser.parallel = false;
    }
    if let Some(threads) = args.threads {
        if threads == 0 {
            bail!("--threads must be at least 1");
        }
        config.parser.worker_threads = Some(threads);
    }
    if let Some(max_blocks) = args.max_blocks {
        config.parser.max_blocks = Some(max_blocks);
    }
    let format = args.format.unwrap_or(config.output.format);
    let output = args.output.clone().or_else(|| config.output.path.clone());

    let catalog = config.catalog()?;
    log::debug!("Pattern catalog ready with {} definitions", catalog.len());

    log::info!("Reading trace: {:?}", log_path);
    let trace = fs::read_to_string(&log_path)
        .with_context(|| format!("Failed to read trace file: {:?}", log_path))?;

    let parser = LogParser::new(&catalog, config.parser.clone());
    let report = parser
        .parse_log(&trace)
        .with_context(|| format!("Failed to parse trace file: {:?}", log_path))?;

    let summary = report.summary();
    log::info!(
        "Parsed {} of {} blocks ({} passed, {} failed, {} dropped)",
        summary.parsed,
        summary.total_blocks,
        summary.passed,
        summary.failed,
        summary.dropped
    );
    for failure in &report.failures {
        log::warn!("Block {} ({}) dropped: {}", failure.index, failure.command, failure.error);
    }

    let rendered =
        report::render_report(&report, &log_path, format, config.output.include_summary)?;
    report::write_output(&rendered, output.as_deref())?;

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
