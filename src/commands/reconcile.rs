use anyhow::Result;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::error::OrganizerError;
use crate::organizer::audit;
use crate::organizer::classify::ClassificationTable;
use crate::organizer::config::{self, OrganizerConfig};
use crate::organizer::record::RunMode;
use crate::organizer::run::reconcile;

#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    pub root: Option<PathBuf>,
    pub prefix: Option<String>,
    pub keywords: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
    /// None keeps whatever the config resolved; Some overrides it.
    pub apply: Option<bool>,
}

fn apply_overrides(cfg: &mut OrganizerConfig, opts: &ReconcileOptions) {
    if let Some(root) = &opts.root {
        cfg.organize_root = root.clone();
    }
    if let Some(prefix) = &opts.prefix {
        cfg.judgment_prefix = prefix.clone();
    }
    if let Some(keywords) = &opts.keywords {
        cfg.keywords_path = keywords.clone();
    }
    if let Some(reports_dir) = &opts.reports_dir {
        cfg.reports_dir = reports_dir.clone();
    }
    if let Some(apply) = opts.apply {
        cfg.apply = apply;
    }
}

pub fn run(opts: &ReconcileOptions) -> Result<CommandReport> {
    let mut cfg = config::load_config()?;
    apply_overrides(&mut cfg, opts);
    config::validate_overridden(&cfg)?;

    if cfg.organize_root.as_os_str().is_empty() {
        return Err(OrganizerError::MissingRoot(
            "pass --root or set EXPEDIENTES_ROOT".to_string(),
        )
        .into());
    }

    let table = ClassificationTable::from_json_file(&cfg.keywords_path)?;
    let mode = if cfg.apply {
        RunMode::Apply
    } else {
        RunMode::Simulate
    };

    let mut report = CommandReport::new("reconcile");
    report.detail(format!("organize_root={}", cfg.organize_root.display()));
    report.detail(format!("judgment_prefix={}", cfg.judgment_prefix));
    report.detail(format!("mode={}", mode.as_str()));
    report.detail(format!(
        "categories={}",
        table.categories().collect::<Vec<_>>().join(",")
    ));

    let result = reconcile(&cfg, &table, mode)?;
    report.detail(result.summary());
    report.detail(format!("actions={}", result.total_actions()));

    for path in audit::persist_run(&cfg.reports_dir, "reconcile", &result)? {
        report.detail(format!("report={}", path.display()));
    }

    if !result.errors.is_empty() {
        report.issue(format!(
            "{} item(s) failed; see the errors report",
            result.errors.len()
        ));
    }
    if !result.conflicts.is_empty() {
        report.issue(format!(
            "{} unresolved conflict(s); see the conflicts report",
            result.conflicts.len()
        ));
    }

    let status = if report.ok { "ok" } else { "issues" };
    audit::append_event(&cfg.reports_dir, "reconcile", mode, status, &result.summary())?;

    Ok(report)
}
