use crate::organizer::fsview::FsView;
use crate::organizer::plan::PlanOutcome;
use crate::organizer::record::ActionRecord;
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct OrphanOutcome {
    pub moved: Vec<ActionRecord>,
    pub skipped: Vec<ActionRecord>,
    pub errors: Vec<ActionRecord>,
}

/// Route loose top-level files of a case root into the Principal container.
///
/// Runs strictly after the planner, against the planner's own listing
/// snapshot, so the Principal destination is already settled. Files are
/// only moved when the Principal directory does not exist at all (really
/// or virtually); if planning left any conflict or error on the Principal
/// destination the router fails safe toward manual review instead of
/// guessing a destination.
pub fn route_orphans(
    view: &mut FsView,
    case_root: &Path,
    plan: &PlanOutcome,
    principal_category: &str,
    orphan_container: &Path,
) -> OrphanOutcome {
    let mut outcome = OrphanOutcome::default();
    if plan.loose_files.is_empty() {
        return outcome;
    }

    let principal_dir = case_root.join(principal_category);

    if plan.blocked_targets.contains(&principal_dir) {
        for name in &plan.loose_files {
            outcome.skipped.push(ActionRecord::Skipped {
                path: case_root.join(name),
                reason: "Principal had unresolved conflicts; needs manual review".to_string(),
            });
        }
        return outcome;
    }

    if view.exists(&principal_dir) {
        for name in &plan.loose_files {
            outcome.skipped.push(ActionRecord::Skipped {
                path: case_root.join(name),
                reason: "Principal exists; files not moved automatically".to_string(),
            });
        }
        return outcome;
    }

    let container = case_root.join(orphan_container);
    if let Err(err) = view.create_dir_all(&container) {
        outcome.errors.push(ActionRecord::Error {
            path: container.clone(),
            reason: format!("{err:#}"),
        });
        for name in &plan.loose_files {
            outcome.skipped.push(ActionRecord::Skipped {
                path: case_root.join(name),
                reason: "Principal container could not be created".to_string(),
            });
        }
        return outcome;
    }

    for name in &plan.loose_files {
        let src = case_root.join(name);
        let dest = view.unique_path(&container.join(name));
        match view.move_entry(&src, &dest) {
            Ok(()) => outcome.moved.push(ActionRecord::Moved {
                from: src,
                to: dest,
            }),
            Err(err) => outcome.errors.push(ActionRecord::Error {
                path: src,
                reason: format!("{err:#}"),
            }),
        }
    }

    outcome
}
