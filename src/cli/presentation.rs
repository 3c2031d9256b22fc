//! CLI presentation: text and json summaries for generate and verify.

use crate::classify::{ClassifyReport, Quarantine};
use crate::error::{ApiError, FormatError};
use crate::manifest::BuildReport;
use crate::types::FileFailure;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::Path;

/// Summary rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(format: &str) -> Result<Self, ApiError> {
        match format {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(ApiError::InputError(format!(
                "Invalid output format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

fn to_json(value: &serde_json::Value) -> Result<String, ApiError> {
    serde_json::to_string_pretty(value).map_err(|e| FormatError::Json(e).into())
}

fn heading(title: &str, color: bool) -> String {
    if color {
        format!("{}", title.bold().underline())
    } else {
        title.to_string()
    }
}

fn push_failures(out: &mut String, failures: &[FileFailure], color: bool) {
    if failures.is_empty() {
        return;
    }
    let title = format!("Failed files ({})", failures.len());
    if color {
        out.push_str(&format!("\n{}\n", title.red().bold()));
    } else {
        out.push_str(&format!("\n{}\n", title));
    }
    for failure in failures {
        out.push_str(&format!("  - {}: {}\n", failure.path, failure.error));
    }
}

pub fn format_generate_summary(
    report: &BuildReport,
    output: &Path,
    format: OutputFormat,
    color: bool,
) -> Result<String, ApiError> {
    if format == OutputFormat::Json {
        return to_json(&json!({
            "output": output,
            "hashed": report.hashed,
            "failures": report.failures,
        }));
    }

    let mut out = format!("{}\n\n", heading("Manifest generated", color));
    out.push_str(&format!("  Files hashed: {}\n", report.hashed));
    out.push_str(&format!("  Checksums saved to {}\n", output.display()));
    push_failures(&mut out, &report.failures, color);
    Ok(out.trim_end().to_string())
}

pub fn format_verify_summary(
    report: &ClassifyReport,
    quarantine: &Quarantine,
    format: OutputFormat,
    color: bool,
) -> Result<String, ApiError> {
    if format == OutputFormat::Json {
        return to_json(&json!({
            "dry_run": report.dry_run,
            "matched": report.matched,
            "outdated": report.outdated,
            "unknown": report.unknown,
            "missing": report.missing,
            "relocations": report.relocations,
            "failures": report.failures,
            "outdated_dir": quarantine.outdated_dir,
            "unknown_dir": quarantine.unknown_dir,
        }));
    }

    let title = if report.dry_run {
        "Verification complete (dry run, nothing moved)"
    } else {
        "Verification complete"
    };
    let mut out = format!("{}\n\n", heading(title, color));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Outcome", "Files", "Destination"]);
    table.add_row(vec!["Matched".to_string(), report.matched.to_string(), "-".to_string()]);
    table.add_row(vec![
        "Outdated".to_string(),
        report.outdated.to_string(),
        quarantine.outdated_dir.display().to_string(),
    ]);
    table.add_row(vec![
        "Unknown".to_string(),
        report.unknown.to_string(),
        quarantine.unknown_dir.display().to_string(),
    ]);
    out.push_str(&format!("{}\n", table));

    if !report.relocations.is_empty() {
        let verb = if report.dry_run { "Would move" } else { "Moved" };
        out.push_str(&format!("\n{}\n", heading(verb, color)));
        for relocation in &report.relocations {
            out.push_str(&format!(
                "  {:<8} {} -> {}\n",
                relocation.outcome,
                relocation.path,
                relocation.destination.display()
            ));
        }
    }

    if !report.missing.is_empty() {
        out.push_str(&format!(
            "\n  {} manifest entries have no file in the tree\n",
            report.missing.len()
        ));
    }

    push_failures(&mut out, &report.failures, color);
    Ok(out.trim_end().to_string())
}
