use crate::organizer::classify::ClassificationTable;
use crate::organizer::fsview::{FsView, list_children};
use crate::organizer::merge::merge_tree;
use crate::organizer::record::ActionRecord;
use anyhow::Result;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct PlanOutcome {
    pub renamed: Vec<ActionRecord>,
    pub merged: Vec<ActionRecord>,
    pub skipped: Vec<ActionRecord>,
    pub conflicts: Vec<ActionRecord>,
    pub errors: Vec<ActionRecord>,
    /// Destination paths that accumulated at least one Error or Conflict.
    /// The orphan router refuses to route into any of these.
    pub blocked_targets: BTreeSet<PathBuf>,
    /// Loose top-level file names from the same listing snapshot, kept for
    /// the orphan router so the case root is read exactly once.
    pub loose_files: Vec<String>,
}

/// Classify the immediate subfolders of one case root, group them by
/// canonical destination, and rename or merge each group into place.
///
/// The case root is listed once; that snapshot drives every decision.
/// A failure on one group never aborts the remaining groups.
pub fn plan_case_root(
    view: &mut FsView,
    case_root: &Path,
    table: &ClassificationTable,
) -> Result<PlanOutcome> {
    let listing = list_children(case_root)?;

    let mut outcome = PlanOutcome {
        loose_files: listing.files,
        ..PlanOutcome::default()
    };

    for raw in &listing.undecodable {
        outcome.skipped.push(ActionRecord::Skipped {
            path: case_root.join(raw),
            reason: "name is not valid UTF-8; needs manual review".to_string(),
        });
    }

    // name -> members, insertion in listing order so the first member of
    // each group is the deterministic rename target
    let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    for name in &listing.dirs {
        let src = case_root.join(name);
        let Some(category) = table.classify(name) else {
            outcome.skipped.push(ActionRecord::Skipped {
                path: src,
                reason: "Unrecognized keyword".to_string(),
            });
            continue;
        };

        let dest = case_root.join(category);
        if src == dest {
            // already carries its canonical name; nothing to do, which is
            // what makes a second run produce zero rename/merge actions
            continue;
        }
        groups.entry(dest).or_default().push(src);
    }

    for (dest, members) in groups {
        let errors_before = outcome.errors.len();
        let conflicts_before = outcome.conflicts.len();

        reconcile_group(view, &dest, &members, &mut outcome);

        if outcome.errors.len() > errors_before || outcome.conflicts.len() > conflicts_before {
            outcome.blocked_targets.insert(dest);
        }
    }

    Ok(outcome)
}

fn reconcile_group(
    view: &mut FsView,
    dest: &Path,
    members: &[PathBuf],
    outcome: &mut PlanOutcome,
) {
    let mut remaining = members;

    if !view.exists(dest) {
        // destination is free: the first member takes it over wholesale
        let (primary, rest) = members.split_first().expect("group has members");
        match view.move_entry(primary, dest) {
            Ok(()) => outcome.renamed.push(ActionRecord::Renamed {
                from: primary.clone(),
                to: dest.to_path_buf(),
            }),
            Err(err) => outcome.errors.push(ActionRecord::Error {
                path: primary.clone(),
                reason: format!("{err:#}"),
            }),
        }
        remaining = rest;
    }

    // everything else folds into the destination subtree
    for member in remaining {
        outcome.merged.push(ActionRecord::Merged {
            from: member.clone(),
            to: dest.to_path_buf(),
        });
        let merge = merge_tree(view, member, dest);
        outcome.merged.extend(merge.moved);
        outcome.errors.extend(merge.errors);
    }
}
