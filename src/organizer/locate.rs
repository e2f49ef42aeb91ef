use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find every directory under `organize_root` whose name starts with the
/// institutional judgment-ID prefix. The scan is recursive, so case roots
/// nested under grouping folders (or under other case roots, as legacy
/// layouts sometimes have) are all found. Results are discovered fresh on
/// every run and returned in walk order, sorted by file name per level.
pub fn find_case_roots(organize_root: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    if !organize_root.is_dir() {
        anyhow::bail!("organize root {} is not a directory", organize_root.display());
    }

    let mut roots = Vec::new();
    for entry in WalkDir::new(organize_root).sort_by_file_name() {
        // an unreadable subtree must not abort discovery of the rest
        let Ok(entry) = entry else {
            continue;
        };
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.starts_with(prefix) {
            roots.push(entry.into_path());
        }
    }
    Ok(roots)
}
