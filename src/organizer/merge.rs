use crate::organizer::fsview::{FsView, list_children};
use crate::organizer::record::ActionRecord;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub moved: Vec<ActionRecord>,
    pub errors: Vec<ActionRecord>,
}

impl MergeOutcome {
    pub fn absorb(&mut self, mut other: MergeOutcome) {
        self.moved.append(&mut other.moved);
        self.errors.append(&mut other.errors);
    }
}

/// Merge the contents of `src` into `dst` without ever overwriting.
///
/// Same-named subdirectories on both sides are merged in place; everything
/// else is moved under a collision-free name. The walk uses an explicit
/// work stack so pathologically deep legacy trees cannot exhaust the call
/// stack. Merging is best-effort: each failed item becomes an Error record
/// and processing continues with the next one.
///
/// Source directories are removed children-first afterwards, and only when
/// empty; leftover residue under partial failure is tolerated silently.
pub fn merge_tree(view: &mut FsView, src: &Path, dst: &Path) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    if view.exists(dst) && !view.is_dir(dst) {
        outcome.errors.push(ActionRecord::Error {
            path: src.to_path_buf(),
            reason: format!("merge destination {} is not a directory", dst.display()),
        });
        return outcome;
    }

    let mut stack: Vec<(PathBuf, PathBuf)> = vec![(src.to_path_buf(), dst.to_path_buf())];
    let mut visited_sources: Vec<PathBuf> = Vec::new();

    while let Some((src_dir, dst_dir)) = stack.pop() {
        visited_sources.push(src_dir.clone());

        if let Err(err) = view.create_dir_all(&dst_dir) {
            outcome.errors.push(ActionRecord::Error {
                path: src_dir.clone(),
                reason: format!("{err:#}"),
            });
            continue;
        }

        let listing = match list_children(&src_dir) {
            Ok(listing) => listing,
            Err(err) => {
                outcome.errors.push(ActionRecord::Error {
                    path: src_dir.clone(),
                    reason: format!("{err:#}"),
                });
                continue;
            }
        };

        for raw in &listing.undecodable {
            outcome.errors.push(ActionRecord::Error {
                path: src_dir.join(raw),
                reason: "name is not valid UTF-8; left in place for manual handling".to_string(),
            });
        }

        for name in listing.dirs {
            let entry = src_dir.join(&name);
            let target = dst_dir.join(&name);

            if view.is_dir(&target) {
                // nested collision: merge instead of flattening
                stack.push((entry, target));
                continue;
            }

            // no same-named directory on the other side; a unique name
            // still guards against an unrelated file called the same
            let unique = view.unique_path(&target);
            match view.move_entry(&entry, &unique) {
                Ok(()) => outcome.moved.push(ActionRecord::Moved {
                    from: entry,
                    to: unique,
                }),
                Err(err) => outcome.errors.push(ActionRecord::Error {
                    path: entry,
                    reason: format!("{err:#}"),
                }),
            }
        }

        for name in listing.files {
            let entry = src_dir.join(&name);
            let unique = view.unique_path(&dst_dir.join(&name));
            match view.move_entry(&entry, &unique) {
                Ok(()) => outcome.moved.push(ActionRecord::Moved {
                    from: entry,
                    to: unique,
                }),
                Err(err) => outcome.errors.push(ActionRecord::Error {
                    path: entry,
                    reason: format!("{err:#}"),
                }),
            }
        }
    }

    for dir in visited_sources.iter().rev() {
        view.remove_dir_if_empty(dir);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::merge_tree;
    use crate::organizer::fsview::FsView;
    use crate::organizer::record::{ActionRecord, RunMode};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn relative_rows(records: &[ActionRecord], base: &Path) -> Vec<Vec<String>> {
        records
            .iter()
            .map(|record| {
                record
                    .row()
                    .iter()
                    .map(|cell| cell.replace(&base.display().to_string(), ""))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn merge_keeps_both_copies_of_colliding_files() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).expect("mkdir");
        fs::create_dir_all(&dst).expect("mkdir");
        fs::write(src.join("doc.txt"), "from src").expect("write");
        fs::write(dst.join("doc.txt"), "from dst").expect("write");

        let mut view = FsView::new(RunMode::Apply);
        let outcome = merge_tree(&mut view, &src, &dst);

        assert!(outcome.errors.is_empty());
        assert_eq!(fs::read_to_string(dst.join("doc.txt")).expect("read"), "from dst");
        assert_eq!(
            fs::read_to_string(dst.join("doc_1.txt")).expect("read"),
            "from src"
        );
        assert!(!src.exists(), "emptied source should be removed");
    }

    #[test]
    fn merge_recurses_into_same_named_subdirectories() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("anexos/fotos")).expect("mkdir");
        fs::create_dir_all(dst.join("anexos")).expect("mkdir");
        fs::write(src.join("anexos/escrito.pdf"), "pdf").expect("write");
        fs::write(dst.join("anexos/otro.pdf"), "pdf").expect("write");

        let mut view = FsView::new(RunMode::Apply);
        let outcome = merge_tree(&mut view, &src, &dst);

        assert!(outcome.errors.is_empty());
        assert!(dst.join("anexos/escrito.pdf").is_file());
        assert!(dst.join("anexos/otro.pdf").is_file());
        assert!(dst.join("anexos/fotos").is_dir());
        assert!(!src.exists());
    }

    #[test]
    fn merge_renames_directory_colliding_with_unrelated_file() {
        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(src.join("anexos")).expect("mkdir");
        fs::create_dir_all(&dst).expect("mkdir");
        fs::write(src.join("anexos/a.txt"), "a").expect("write");
        fs::write(dst.join("anexos"), "a file, not a folder").expect("write");

        let mut view = FsView::new(RunMode::Apply);
        let outcome = merge_tree(&mut view, &src, &dst);

        assert!(outcome.errors.is_empty());
        assert!(dst.join("anexos").is_file());
        assert!(dst.join("anexos_1/a.txt").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn merge_reports_undecodable_names_and_leaves_them_in_place() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).expect("mkdir");
        fs::create_dir_all(&dst).expect("mkdir");
        let raw_name = OsStr::from_bytes(b"acta\xff.pdf");
        fs::write(src.join(raw_name), "x").expect("write");
        fs::write(src.join("ok.pdf"), "x").expect("write");

        let mut view = FsView::new(RunMode::Apply);
        let outcome = merge_tree(&mut view, &src, &dst);

        assert!(dst.join("ok.pdf").is_file());
        assert_eq!(outcome.errors.len(), 1);
        match &outcome.errors[0] {
            ActionRecord::Error { reason, .. } => {
                assert!(reason.contains("not valid UTF-8"));
            }
            other => panic!("unexpected record: {other:?}"),
        }
        // the untouched entry keeps its source dir alive
        assert!(src.join(raw_name).is_file());
    }

    #[test]
    fn simulate_and_apply_decide_identically() {
        let build = |root: &Path| {
            let src = root.join("src");
            let dst = root.join("dst");
            fs::create_dir_all(src.join("anexos")).expect("mkdir");
            fs::create_dir_all(dst.join("anexos")).expect("mkdir");
            fs::write(src.join("doc.txt"), "1").expect("write");
            fs::write(dst.join("doc.txt"), "2").expect("write");
            fs::write(src.join("anexos/x.txt"), "3").expect("write");
            fs::write(dst.join("anexos/x.txt"), "4").expect("write");
            (src, dst)
        };

        let sim_tmp = tempdir().expect("tempdir");
        let (sim_src, sim_dst) = build(sim_tmp.path());
        let mut sim_view = FsView::new(RunMode::Simulate);
        let sim = merge_tree(&mut sim_view, &sim_src, &sim_dst);

        let apply_tmp = tempdir().expect("tempdir");
        let (apply_src, apply_dst) = build(apply_tmp.path());
        let mut apply_view = FsView::new(RunMode::Apply);
        let applied = merge_tree(&mut apply_view, &apply_src, &apply_dst);

        assert_eq!(
            relative_rows(&sim.moved, sim_tmp.path()),
            relative_rows(&applied.moved, apply_tmp.path())
        );
        assert!(sim.errors.is_empty());
        assert!(applied.errors.is_empty());

        // the simulated tree is untouched
        assert!(sim_src.join("doc.txt").is_file());
        assert!(!sim_dst.join("doc_1.txt").exists());
    }
}
