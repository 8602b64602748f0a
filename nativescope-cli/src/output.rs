use std::path::Path;

use nativescope::analysis::{FileReport, ScanReport};
use serde::Serialize;

use crate::collect::{Collected, Unreadable};

#[derive(Debug, Serialize)]
struct FindingInfo<'a> {
    source_path: &'a str,
    qualified_name: &'a str,
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct WarningInfo {
    path: String,
    reason: String,
}

#[derive(Debug, Serialize)]
struct ReportInfo<'a> {
    total: usize,
    findings: Vec<FindingInfo<'a>>,
    warnings: Vec<WarningInfo>,
}

pub fn print_banner() {
    println!("-------------------");
    println!("-  nativescope    -");
    println!("-------------------");
    println!();
}

pub fn print_path_not_found(path: &Path) {
    println!("WARNING: Path not found {}", path.display());
}

pub fn print_unreadable(directory: &Unreadable) {
    println!(
        "WARNING: Cannot read directory {} ({})",
        directory.path.display(),
        directory.reason
    );
}

/// Progress line of one analyzed file, followed by a warning if it failed.
pub fn print_progress(file: &FileReport) {
    println!("Analyzing {}...", file.path.display());
    if file.outcome.is_err() {
        println!(
            "WARNING: {} does not appear to be a valid managed assembly",
            file.path.display()
        );
    }
}

pub fn print_summary(report: &ScanReport) {
    println!();
    println!("Done. Found {} p/invokes", report.finding_count());
    println!();
    for finding in report.findings() {
        println!("{finding}");
    }
}

/// The whole run as one JSON document.
pub fn print_json(report: &ScanReport, collected: &Collected) -> anyhow::Result<()> {
    let findings: Vec<FindingInfo<'_>> = report
        .findings()
        .map(|finding| FindingInfo {
            source_path: &finding.source_path,
            qualified_name: &finding.qualified_name,
            kind: finding.kind.into(),
        })
        .collect();

    let mut warnings: Vec<WarningInfo> = collected
        .missing
        .iter()
        .map(|path| WarningInfo {
            path: path.display().to_string(),
            reason: "path not found".to_string(),
        })
        .collect();
    warnings.extend(collected.unreadable.iter().map(|directory| WarningInfo {
        path: directory.path.display().to_string(),
        reason: format!("cannot read directory: {}", directory.reason),
    }));
    warnings.extend(report.failures().filter_map(|file| {
        file.outcome.as_ref().err().map(|error| WarningInfo {
            path: file.path.display().to_string(),
            reason: error.to_string(),
        })
    }));

    let info = ReportInfo {
        total: findings.len(),
        findings,
        warnings,
    };

    let json = serde_json::to_string_pretty(&info)?;
    println!("{json}");
    Ok(())
}
