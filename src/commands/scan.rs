use anyhow::Result;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::error::OrganizerError;
use crate::organizer::audit;
use crate::organizer::classify::ClassificationTable;
use crate::organizer::config::{self, OrganizerConfig};
use crate::organizer::fsview::list_children;
use crate::organizer::locate::find_case_roots;

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub root: Option<PathBuf>,
    pub prefix: Option<String>,
    pub keywords: Option<PathBuf>,
    pub reports_dir: Option<PathBuf>,
}

fn apply_overrides(cfg: &mut OrganizerConfig, opts: &ScanOptions) {
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
}

/// Read-only survey of every case root: which ones already look canonical
/// and which ones still hold unrecognized subfolders needing a keyword
/// update or manual review. Never mutates the tree.
pub fn run(opts: &ScanOptions) -> Result<CommandReport> {
    let mut cfg = config::load_config()?;
    apply_overrides(&mut cfg, opts);
    config::validate_overridden(&cfg)?;

    if cfg.organize_root.as_os_str().is_empty() {
        return Err(OrganizerError::MissingRoot(
            "pass --root or set EXPEDIENTES_ROOT".to_string(),
        )
        .into());
    }

    let table = if cfg.keywords_path.is_file() {
        Some(ClassificationTable::from_json_file(&cfg.keywords_path)?)
    } else {
        None
    };

    let mut report = CommandReport::new("scan");
    report.detail(format!("organize_root={}", cfg.organize_root.display()));
    report.detail(format!("judgment_prefix={}", cfg.judgment_prefix));

    let roots = find_case_roots(&cfg.organize_root, &cfg.judgment_prefix)?;
    report.detail(format!("case_roots={}", roots.len()));

    let Some(table) = table else {
        report.detail("no classification table found; listing roots only");
        for root in &roots {
            report.detail(format!("case_root={}", root.display()));
        }
        return Ok(report);
    };

    let mut review_rows: Vec<Vec<String>> = Vec::new();
    let mut clean = 0usize;

    for root in &roots {
        // one unreadable root goes onto the review list, not over the run
        let listing = match list_children(root) {
            Ok(listing) => listing,
            Err(err) => {
                review_rows.push(vec![
                    root.display().to_string(),
                    format!("unreadable: {err:#}"),
                    String::new(),
                ]);
                continue;
            }
        };

        let mut unrecognized: Vec<String> = listing
            .dirs
            .iter()
            .filter(|name| {
                table.classify(name).is_none() && table.categories().all(|c| c != name.as_str())
            })
            .cloned()
            .collect();
        unrecognized.extend(
            listing
                .undecodable
                .iter()
                .map(|raw| raw.to_string_lossy().into_owned()),
        );

        if unrecognized.is_empty() {
            clean += 1;
        } else {
            review_rows.push(vec![
                root.display().to_string(),
                unrecognized.join("; "),
                listing.files.len().to_string(),
            ]);
        }
    }

    report.detail(format!("classifiable_roots={clean}"));
    report.detail(format!("roots_needing_review={}", review_rows.len()));

    if !review_rows.is_empty() {
        let path = audit::write_report(
            &cfg.reports_dir,
            "scan",
            "structure_review",
            &["Case Root", "Unrecognized Subfolders", "Loose Files"],
            &review_rows,
        )?;
        report.detail(format!("report={}", path.display()));
    }

    Ok(report)
}
