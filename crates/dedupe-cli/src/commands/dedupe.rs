//! `dedupe-dependencies` run and output.

use dedupe_core::{dedupe, Config, DedupeOptions, DedupeReport, FsInstallTree};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

/// Run result for JSON output (locked format: { ok, dedupe }).
#[derive(Serialize)]
struct DedupeJsonResult {
    ok: bool,
    dedupe: Option<DedupeReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Run one dedupe pass over the project and print the outcome.
///
/// Exits with status 1 when the run fails before anything is removed.
/// Individual removal failures are printed but keep status 0.
pub fn run(config: &Config, options: &DedupeOptions, json: bool) -> Result<()> {
    match dedupe(config, options, &FsInstallTree) {
        Ok(report) => {
            if json {
                print_json(&DedupeJsonResult {
                    ok: true,
                    dedupe: Some(report),
                    error: None,
                })?;
            } else {
                print_human(&report);
            }
            Ok(())
        }
        Err(e) => {
            if json {
                print_json(&DedupeJsonResult {
                    ok: false,
                    dedupe: None,
                    error: Some(format!("{}: {e}", e.code())),
                })?;
            } else {
                eprintln!("error: {e}");
            }
            std::process::exit(1);
        }
    }
}

fn print_json(result: &DedupeJsonResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result).into_diagnostic()?;
    println!("{json}");
    Ok(())
}

fn print_human(report: &DedupeReport) {
    if report.doomed.is_empty() {
        println!("No duplicate dependencies found in {}", report.root);
        return;
    }

    let verb = if report.dry_run { "Would remove" } else { "Removing" };
    for copy in &report.doomed {
        println!(
            "{verb} {}@{} at {} (using {})",
            copy.name,
            display_version(&copy.version),
            copy.path.display(),
            copy.retained.display()
        );
    }

    for failure in &report.failures {
        eprintln!(
            "! {}: {} {}",
            failure.path.display(),
            failure.code,
            failure.message
        );
    }

    if report.dry_run {
        println!(
            "\n{} duplicate copies would be removed, freeing {}",
            report.doomed.len(),
            format_bytes(report.freed_bytes)
        );
    } else {
        println!(
            "\nRemoved {} of {} duplicate copies, freed {}",
            report.removed.len(),
            report.doomed.len(),
            format_bytes(report.freed_bytes)
        );
    }

    if !report.is_clean() {
        eprintln!("{} copies could not be removed", report.failures.len());
    }
}

fn display_version(version: &str) -> &str {
    if version.is_empty() {
        "<unversioned>"
    } else {
        version
    }
}

/// Format a byte count for display.
fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_073_741_824 {
        format!("{:.1}GB", bytes as f64 / 1_073_741_824.0)
    } else if bytes >= 1_048_576 {
        format!("{:.1}MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}B")
    }
}
