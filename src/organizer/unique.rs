use std::path::{Path, PathBuf};

/// Return the first variant of `desired` for which `taken` is false,
/// probing `stem_1.ext`, `stem_2.ext`, … after the unchanged name.
///
/// Deterministic for a fixed answer from `taken`; callers batching several
/// moves must re-probe before each one, since earlier moves may have taken
/// the previous candidate.
pub fn unique_path_with(desired: &Path, taken: impl Fn(&Path) -> bool) -> PathBuf {
    if !taken(desired) {
        return desired.to_path_buf();
    }

    let stem = desired
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed");
    let ext = desired.extension().and_then(|s| s.to_str());

    let mut counter = 1u64;
    loop {
        let candidate_name = match ext {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        let candidate = desired.with_file_name(candidate_name);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Collision-free variant of `desired` against the real filesystem.
pub fn unique_path(desired: &Path) -> PathBuf {
    unique_path_with(desired, Path::exists)
}
