use crate::organizer::record::RunMode;
use crate::organizer::unique::unique_path_with;
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const MAX_REDIRECTS: usize = 32;

/// Filesystem view shared by both run modes.
///
/// In Apply mode every operation mutates the real tree. In Simulate mode
/// nothing is touched; instead each decided move is recorded as a
/// redirection from its destination to the still-in-place source, and the
/// source is marked vacated under its original name. Later existence
/// checks and unique-name probes therefore observe the state Apply would
/// have produced: content visible at its new name, gone from its old one.
/// This is what keeps dry-run decisions identical to real ones for a
/// fixed snapshot.
#[derive(Debug)]
pub struct FsView {
    mode: RunMode,
    // virtual destination -> real backing path (Simulate only)
    moves: BTreeMap<PathBuf, PathBuf>,
    // directories created virtually, with no backing (Simulate only)
    created: BTreeSet<PathBuf>,
    // real paths vacated by a recorded move or removal (Simulate only)
    removed: BTreeSet<PathBuf>,
}

impl FsView {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            moves: BTreeMap::new(),
            created: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }

    /// Rewrite `path` through the recorded moves: the longest claimed
    /// ancestor wins and redirects the whole tail onto its backing path.
    /// Returns None for a path vacated under its original name.
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        // vacated at this name, unless a later move claimed it back
        for ancestor in path.ancestors() {
            if self.moves.contains_key(ancestor) {
                break;
            }
            if self.removed.contains(ancestor) {
                return None;
            }
        }

        let mut current = path.to_path_buf();
        for _ in 0..MAX_REDIRECTS {
            let mut rewritten = None;
            for ancestor in current.ancestors() {
                if let Some(backing) = self.moves.get(ancestor) {
                    let tail = current.strip_prefix(ancestor).expect("claimed ancestor");
                    rewritten = Some(backing.join(tail));
                    break;
                }
            }
            match rewritten {
                Some(next) => current = next,
                None => break,
            }
        }
        Some(current)
    }

    pub fn exists(&self, path: &Path) -> bool {
        if self.created.contains(path) {
            return true;
        }
        self.resolve(path).is_some_and(|real| real.exists())
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        if self.created.contains(path) {
            return true;
        }
        self.resolve(path).is_some_and(|real| real.is_dir())
    }

    /// Collision-free destination for `desired`, counting both the real
    /// tree and every move already decided in this run as taken.
    pub fn unique_path(&self, desired: &Path) -> PathBuf {
        unique_path_with(desired, |candidate| self.exists(candidate))
    }

    /// Move one file or directory. Apply renames on disk (files fall back
    /// to copy+remove across devices); Simulate records the redirection
    /// and vacates the source.
    pub fn move_entry(&mut self, from: &Path, to: &Path) -> Result<()> {
        if from == to {
            return Ok(());
        }
        if self.mode.is_apply() {
            move_on_disk(from, to)?;
        } else {
            self.moves.insert(to.to_path_buf(), from.to_path_buf());
            self.removed.insert(from.to_path_buf());
        }
        Ok(())
    }

    pub fn create_dir_all(&mut self, path: &Path) -> Result<()> {
        if self.mode.is_apply() {
            fs::create_dir_all(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
        } else if !self.exists(path) {
            self.created.insert(path.to_path_buf());
        }
        Ok(())
    }

    /// Best-effort removal of a directory that should now be empty.
    /// Residue under partial failure is expected, so failures are ignored.
    /// Simulate marks the directory vacated once every real child has
    /// been claimed elsewhere, matching what Apply's remove would do.
    pub fn remove_dir_if_empty(&mut self, path: &Path) {
        if self.mode.is_apply() {
            let _ = fs::remove_dir(path);
            return;
        }

        let Ok(read_dir) = fs::read_dir(path) else {
            return;
        };
        for entry in read_dir {
            let Ok(entry) = entry else {
                return;
            };
            if self.exists(&entry.path()) {
                return;
            }
        }
        self.removed.insert(path.to_path_buf());
    }
}

fn move_on_disk(from: &Path, to: &Path) -> Result<()> {
    if from == to {
        return Ok(());
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    match fs::rename(from, to) {
        Ok(_) => Ok(()),
        Err(rename_err) => {
            let fallback = matches!(
                rename_err.kind(),
                ErrorKind::CrossesDevices | ErrorKind::PermissionDenied
            );
            if fallback && from.is_file() {
                fs::copy(from, to).with_context(|| {
                    format!("failed to copy {} to {}", from.display(), to.display())
                })?;
                fs::remove_file(from)
                    .with_context(|| format!("failed to remove {}", from.display()))?;
                Ok(())
            } else {
                Err(rename_err).with_context(|| {
                    format!("failed to move {} to {}", from.display(), to.display())
                })
            }
        }
    }
}

/// One directory's immediate children, split by kind and sorted by name
/// so decisions do not depend on platform enumeration order.
#[derive(Debug, Default)]
pub struct DirListing {
    pub dirs: Vec<String>,
    pub files: Vec<String>,
    /// Names that are not valid UTF-8. Callers report these; the engine
    /// never classifies or moves them.
    pub undecodable: Vec<OsString>,
}

pub fn list_children(dir: &Path) -> Result<DirListing> {
    let mut listing = DirListing::default();

    let read_dir =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in read_dir {
        let entry = entry?;
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                listing.undecodable.push(raw);
                continue;
            }
        };
        if entry.file_type()?.is_dir() {
            listing.dirs.push(name);
        } else {
            listing.files.push(name);
        }
    }

    listing.dirs.sort();
    listing.files.sort();
    listing.undecodable.sort();
    Ok(listing)
}
