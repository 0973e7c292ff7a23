//! Working tree diff collection using git2.

use std::fmt;
use std::path::Path;

use git2::{Delta, Diff, DiffFindOptions, DiffOptions, ErrorCode, Patch, Repository, Tree};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RepositoryError;

/// Maximum added/removed lines kept per file for change-type cues.
pub const MAX_CUE_LINES: usize = 2_000;

/// Status of a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "Added"),
            FileStatus::Modified => write!(f, "Modified"),
            FileStatus::Deleted => write!(f, "Deleted"),
            FileStatus::Renamed => write!(f, "Renamed"),
        }
    }
}

/// One changed file with the line-level metadata the heuristics need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// Repo-relative path with `/` separators (new path for renames).
    pub path: String,
    /// Previous path for renamed files.
    pub old_path: Option<String>,
    pub status: FileStatus,
    pub additions: usize,
    pub deletions: usize,
    pub added_lines: Vec<String>,
    pub removed_lines: Vec<String>,
    pub binary: bool,
}

impl FileDiff {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            old_path: None,
            status,
            additions: 0,
            deletions: 0,
            added_lines: Vec::new(),
            removed_lines: Vec::new(),
            binary: false,
        }
    }
}

/// Changed files partitioned by status, each list in diff order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeDiff {
    pub added: Vec<FileDiff>,
    pub modified: Vec<FileDiff>,
    pub deleted: Vec<FileDiff>,
    pub renamed: Vec<FileDiff>,
}

impl WorkingTreeDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.modified.is_empty()
            && self.deleted.is_empty()
            && self.renamed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len() + self.renamed.len()
    }

    fn push(&mut self, file: FileDiff) {
        match file.status {
            FileStatus::Added => self.added.push(file),
            FileStatus::Modified => self.modified.push(file),
            FileStatus::Deleted => self.deleted.push(file),
            FileStatus::Renamed => self.renamed.push(file),
        }
    }
}

/// Open the repository containing `path`.
pub fn open_repository(path: &Path) -> Result<Repository, RepositoryError> {
    let repo = Repository::discover(path).map_err(RepositoryError::Open)?;
    if repo.is_bare() {
        return Err(RepositoryError::Bare);
    }
    Ok(repo)
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, RepositoryError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(RepositoryError::Diff(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(RepositoryError::Diff)?;
    Ok(Some(tree))
}

/// Collect changes against the last commit.
///
/// With `include_unstaged` false only the index is compared (staged changes).
/// Otherwise the working tree is compared through the index, so staged,
/// unstaged and untracked changes all show up.
pub fn collect_diff(
    repo: &Repository,
    include_unstaged: bool,
) -> Result<WorkingTreeDiff, RepositoryError> {
    let head_tree = resolve_head_tree(repo)?;

    let mut diff = if include_unstaged {
        let mut opts = DiffOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .show_untracked_content(true);
        repo.diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut opts))
            .map_err(RepositoryError::Diff)?
    } else {
        repo.diff_tree_to_index(head_tree.as_ref(), None, None)
            .map_err(RepositoryError::Diff)?
    };

    detect_renames(&mut diff, include_unstaged)?;

    let changes = files_from_diff(&diff)?;
    debug!(
        "Collected {} changed file(s) (include_unstaged={})",
        changes.len(),
        include_unstaged
    );
    Ok(changes)
}

/// Count files with unstaged or untracked changes (index vs working tree).
pub fn count_unstaged(repo: &Repository) -> Result<usize, RepositoryError> {
    let mut opts = DiffOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);
    let diff = repo
        .diff_index_to_workdir(None, Some(&mut opts))
        .map_err(RepositoryError::Diff)?;
    Ok(diff.deltas().len())
}

fn detect_renames(diff: &mut Diff<'_>, include_untracked: bool) -> Result<(), RepositoryError> {
    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    find_opts.rename_threshold(50);
    if include_untracked {
        find_opts.for_untracked(true);
    }
    diff.find_similar(Some(&mut find_opts))
        .map_err(RepositoryError::Diff)
}

fn files_from_diff(diff: &Diff<'_>) -> Result<WorkingTreeDiff, RepositoryError> {
    let mut changes = WorkingTreeDiff::default();

    for (idx, delta) in diff.deltas().enumerate() {
        let status = match delta.status() {
            Delta::Added | Delta::Untracked | Delta::Copied => FileStatus::Added,
            Delta::Modified | Delta::Typechange | Delta::Conflicted => FileStatus::Modified,
            Delta::Deleted => FileStatus::Deleted,
            Delta::Renamed => FileStatus::Renamed,
            _ => continue,
        };

        let new_path = delta.new_file().path().map(path_to_string);
        let old_path = delta.old_file().path().map(path_to_string);

        let (path, old_path) = match status {
            FileStatus::Renamed => (new_path.clone().or_else(|| old_path.clone()), old_path),
            FileStatus::Deleted => (old_path.or(new_path), None),
            _ => (new_path.or(old_path), None),
        };
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            continue;
        };

        let mut file = FileDiff::new(path, status);
        file.old_path = old_path;
        file.binary = delta.new_file().is_binary() || delta.old_file().is_binary();

        match Patch::from_diff(diff, idx) {
            Ok(Some(patch)) => fill_line_data(&patch, &mut file),
            Ok(None) => file.binary = true,
            Err(e) => {
                warn!("Failed to read patch for {}: {e}", file.path);
            }
        }

        changes.push(file);
    }

    Ok(changes)
}

fn fill_line_data(patch: &Patch<'_>, file: &mut FileDiff) {
    // binary detection happens while the patch loads content
    let delta = patch.delta();
    if delta.new_file().is_binary() || delta.old_file().is_binary() {
        file.binary = true;
    }

    if let Ok((_, additions, deletions)) = patch.line_stats() {
        file.additions = additions;
        file.deletions = deletions;
    }

    for hunk_idx in 0..patch.num_hunks() {
        let Ok(line_count) = patch.num_lines_in_hunk(hunk_idx) else {
            continue;
        };
        for line_idx in 0..line_count {
            let Ok(line) = patch.line_in_hunk(hunk_idx, line_idx) else {
                continue;
            };
            let target = match line.origin() {
                '+' => &mut file.added_lines,
                '-' => &mut file.removed_lines,
                _ => continue,
            };
            if target.len() < MAX_CUE_LINES {
                let content = String::from_utf8_lossy(line.content());
                target.push(content.trim_end_matches(['\n', '\r']).to_string());
            }
        }
    }
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
