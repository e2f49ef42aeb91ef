use crate::organizer::classify::ClassificationTable;
use crate::organizer::config::OrganizerConfig;
use crate::organizer::fsview::FsView;
use crate::organizer::locate::find_case_roots;
use crate::organizer::orphans::route_orphans;
use crate::organizer::plan::plan_case_root;
use crate::organizer::record::{ActionRecord, RunMode, RunResult};
use anyhow::Result;
use std::path::Path;

/// Run the full reconciliation over every case root under the organize
/// root: plan (classify, rename, merge), then orphan routing, both against
/// one view shared by the whole run so simulate and apply decide
/// identically even when case roots are nested inside each other.
///
/// Case roots are isolated from each other: a failure inside one becomes
/// an Error record and the run continues with the next root.
pub fn reconcile(
    cfg: &OrganizerConfig,
    table: &ClassificationTable,
    mode: RunMode,
) -> Result<RunResult> {
    let roots = find_case_roots(&cfg.organize_root, &cfg.judgment_prefix)?;

    let mut view = FsView::new(mode);
    let mut result = RunResult::default();
    for root in roots {
        result.case_roots += 1;

        // an earlier root's rename or merge may have swallowed a nested
        // case root; the view knows this in both modes
        if !view.is_dir(&root) {
            result.skipped.push(ActionRecord::Skipped {
                path: root,
                reason: "case root no longer present".to_string(),
            });
            continue;
        }

        if let Err(err) = reconcile_root(&mut view, &root, cfg, table, &mut result) {
            result.errors.push(ActionRecord::Error {
                path: root,
                reason: format!("{err:#}"),
            });
        }
    }

    Ok(result)
}

fn reconcile_root(
    view: &mut FsView,
    root: &Path,
    cfg: &OrganizerConfig,
    table: &ClassificationTable,
    result: &mut RunResult,
) -> Result<()> {
    let plan = plan_case_root(view, root, table)?;
    let orphans = route_orphans(
        view,
        root,
        &plan,
        &cfg.principal_category,
        Path::new(&cfg.orphan_container),
    );

    result.renamed.extend(plan.renamed);
    result.merged.extend(plan.merged);
    result.skipped.extend(plan.skipped);
    result.conflicts.extend(plan.conflicts);
    result.errors.extend(plan.errors);

    result.orphans.extend(orphans.moved);
    result.skipped.extend(orphans.skipped);
    result.errors.extend(orphans.errors);

    Ok(())
}
