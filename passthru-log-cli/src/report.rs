//! Report generation
//!
//! Turns a parse report into TXT (ASCII tables) or JSON and writes it to a
//! file or stdout.

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use chrono::Local;
use passthru_log_decoder::{render, ParseReport};
use serde_json::json;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Render `report` in the requested format
pub fn render_report(
    report: &ParseReport,
    source: &Path,
    format: OutputFormat,
    include_summary: bool,
) -> Result<String> {
    match format {
        OutputFormat::Txt => Ok(render_txt(report, source, include_summary)),
        OutputFormat::Json => render_json(report, source),
    }
}

fn render_txt(report: &ParseReport, source: &Path, include_summary: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("PassThru Log Report: {}\n", source.display()));
    out.push_str(&format!(
        "Generated: {}\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    if include_summary {
        out.push_str(&report.summary().to_string());
        out.push('\n');
    }

    for expression in &report.expressions {
        out.push_str(&render::expression_table(expression));
        out.push('\n');
    }

    if !report.failures.is_empty() {
        let rows: Vec<Vec<String>> = report
            .failures
            .iter()
            .map(|failure| {
                vec![
                    failure.index.to_string(),
                    failure.command.to_string(),
                    failure.error.to_string(),
                ]
            })
            .collect();
        out.push_str("Dropped Blocks\n");
        out.push_str(&render::text_table(&["Block", "Command", "Error"], &rows));
        out.push('\n');
    }

    out
}

fn render_json(report: &ParseReport, source: &Path) -> Result<String> {
    let summary = report.summary();
    let per_command: serde_json::Map<String, serde_json::Value> = summary
        .per_command
        .iter()
        .map(|(command, count)| (command.name().to_string(), json!(count)))
        .collect();

    let expressions: Vec<_> = report.expressions.iter().map(|e| e.to_json()).collect();
    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|failure| {
            json!({
                "index": failure.index,
                "command": failure.command,
                "error": failure.error.to_string(),
            })
        })
        .collect();

    let document = json!({
        "source": source.display().to_string(),
        "generated": Local::now().to_rfc3339(),
        "summary": {
            "total_blocks": summary.total_blocks,
            "parsed": summary.parsed,
            "passed": summary.passed,
            "failed": summary.failed,
            "dropped": summary.dropped,
            "per_command": per_command,
        },
        "expressions": expressions,
        "failures": failures,
    });

    serde_json::to_string_pretty(&document).context("Failed to serialize report")
}

/// Write rendered output to `path`, or stdout when none is given
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            log::info!("Report written to {:?}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
