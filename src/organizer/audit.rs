use crate::organizer::record::{RunMode, RunResult};
use crate::organizer::unique::unique_path;
use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// One JSON line in `<reports_dir>/audit.log`, appended per run.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub at_epoch_secs: u64,
    pub phase: String,
    pub mode: String,
    pub status: String,
    pub message: String,
}

fn epoch_now() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before UNIX_EPOCH")?
        .as_secs())
}

pub fn append_event(
    reports_dir: &Path,
    phase: &str,
    mode: RunMode,
    status: &str,
    message: &str,
) -> Result<()> {
    fs::create_dir_all(reports_dir)
        .with_context(|| format!("failed to create {}", reports_dir.display()))?;
    let event = AuditEvent {
        at_epoch_secs: epoch_now()?,
        phase: phase.to_string(),
        mode: mode.as_str().to_string(),
        status: status.to_string(),
        message: message.to_string(),
    };

    let line = format!("{}\n", serde_json::to_string(&event)?);
    use std::io::Write;
    let path = reports_dir.join("audit.log");
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

/// Write one timestamped CSV report under `<reports_dir>/<step>/`.
pub fn write_report(
    reports_dir: &Path,
    step: &str,
    filename_prefix: &str,
    header: &[&str],
    rows: &[Vec<String>],
) -> Result<PathBuf> {
    let step_dir = reports_dir.join(step);
    fs::create_dir_all(&step_dir)
        .with_context(|| format!("failed to create {}", step_dir.display()))?;

    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    // two runs inside the same second must not clobber each other
    let report_path = unique_path(&step_dir.join(format!("{filename_prefix}_{timestamp}.csv")));

    let mut writer = csv::Writer::from_path(&report_path)
        .with_context(|| format!("failed to create {}", report_path.display()))?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    Ok(report_path)
}

/// Persist every non-empty action kind of a run as its own CSV report.
pub fn persist_run(reports_dir: &Path, step: &str, result: &RunResult) -> Result<Vec<PathBuf>> {
    let sections: [(&str, &[&str], &[_]); 6] = [
        ("renamed_folders", &["From", "To"], &result.renamed),
        ("merged_folders", &["From", "To"], &result.merged),
        ("moved_files", &["From", "To"], &result.orphans),
        ("skipped", &["Path", "Reason"], &result.skipped),
        ("conflicts", &["Path", "Reason"], &result.conflicts),
        ("errors", &["Path", "Reason"], &result.errors),
    ];

    let mut written = Vec::new();
    for (prefix, header, records) in sections {
        if records.is_empty() {
            continue;
        }
        let rows: Vec<Vec<String>> = records.iter().map(|record| record.row()).collect();
        written.push(write_report(reports_dir, step, prefix, header, &rows)?);
    }
    Ok(written)
}
