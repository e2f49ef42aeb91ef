use serde::Serialize;
use std::path::PathBuf;

/// Execution mode shared by every reconciliation stage.
///
/// Simulate runs the identical decision code as Apply but performs no
/// filesystem mutation; the records it produces are exactly the actions
/// Apply would attempt against the same tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RunMode {
    Simulate,
    Apply,
}

impl RunMode {
    pub fn is_apply(self) -> bool {
        matches!(self, Self::Apply)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Simulate => "simulate",
            Self::Apply => "apply",
        }
    }
}

/// One audited decision. Immutable once created; the unit of report output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ActionRecord {
    Renamed { from: PathBuf, to: PathBuf },
    Merged { from: PathBuf, to: PathBuf },
    Moved { from: PathBuf, to: PathBuf },
    Skipped { path: PathBuf, reason: String },
    Conflict { path: PathBuf, reason: String },
    Error { path: PathBuf, reason: String },
}

impl ActionRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Renamed { .. } => "renamed",
            Self::Merged { .. } => "merged",
            Self::Moved { .. } => "moved",
            Self::Skipped { .. } => "skipped",
            Self::Conflict { .. } => "conflict",
            Self::Error { .. } => "error",
        }
    }

    /// Tabular form consumed by the audit reporter.
    pub fn row(&self) -> Vec<String> {
        match self {
            Self::Renamed { from, to } | Self::Merged { from, to } | Self::Moved { from, to } => {
                vec![from.display().to_string(), to.display().to_string()]
            }
            Self::Skipped { path, reason }
            | Self::Conflict { path, reason }
            | Self::Error { path, reason } => {
                vec![path.display().to_string(), reason.clone()]
            }
        }
    }
}

/// Aggregate outcome of one orchestrator run across every case root.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunResult {
    pub case_roots: usize,
    pub renamed: Vec<ActionRecord>,
    pub merged: Vec<ActionRecord>,
    pub orphans: Vec<ActionRecord>,
    pub skipped: Vec<ActionRecord>,
    pub conflicts: Vec<ActionRecord>,
    pub errors: Vec<ActionRecord>,
}

impl RunResult {
    pub fn total_actions(&self) -> usize {
        self.renamed.len()
            + self.merged.len()
            + self.orphans.len()
            + self.skipped.len()
            + self.conflicts.len()
            + self.errors.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "case_roots={} renamed={} merged={} orphans={} skipped={} conflicts={} errors={}",
            self.case_roots,
            self.renamed.len(),
            self.merged.len(),
            self.orphans.len(),
            self.skipped.len(),
            self.conflicts.len(),
            self.errors.len(),
        )
    }
}
