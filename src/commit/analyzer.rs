//! Change analysis: diff the repository, classify each file, build a change set.

use std::path::Path;

use git2::Repository;
use tracing::debug;

use crate::config::Settings;
use crate::error::RepositoryError;

use super::category::categorize;
use super::change_set::{ChangeSet, FileChange};
use super::diff::{
    FileDiff, FileStatus, WorkingTreeDiff, collect_diff, count_unstaged, open_repository,
};
use super::heuristic::{ChangeContext, DiffCues, Tuning, infer_change_type_with};

/// Most identifiers named in a file's details.
const MAX_NAMED_IDENTIFIERS: usize = 3;

/// Asks whether unstaged and untracked changes should be analyzed too.
///
/// This abstraction allows mocking the interactive prompt in tests.
#[cfg_attr(test, mockall::automock)]
pub trait UnstagedPrompt {
    /// `pending` is the number of files with unstaged or untracked changes.
    fn include_unstaged(&self, pending: usize) -> bool;
}

/// Prompt that always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

impl UnstagedPrompt for FixedAnswer {
    fn include_unstaged(&self, _pending: usize) -> bool {
        self.0
    }
}

/// Analyze the repository at `repo_path`.
///
/// Returns `Ok(None)` when nothing changed since the last commit.
pub fn analyze(
    repo_path: &Path,
    settings: &Settings,
    prompt: &dyn UnstagedPrompt,
) -> Result<Option<ChangeSet>, RepositoryError> {
    let repo = open_repository(repo_path)?;
    analyze_repository(&repo, settings, prompt)
}

/// Same as [`analyze`] for an already opened repository.
pub fn analyze_repository(
    repo: &Repository,
    settings: &Settings,
    prompt: &dyn UnstagedPrompt,
) -> Result<Option<ChangeSet>, RepositoryError> {
    let include_unstaged = settings.include_unstaged_prompt && {
        let pending = count_unstaged(repo)?;
        debug!("{pending} file(s) with unstaged changes");
        pending > 0 && prompt.include_unstaged(pending)
    };

    let diff = collect_diff(repo, include_unstaged)?;
    let tuning = Tuning {
        fix_removal_margin: settings.fix_removal_margin,
    };
    Ok(build_change_set(diff, &tuning))
}

/// Classify every file of a diff. `None` when the diff is empty.
pub fn build_change_set(diff: WorkingTreeDiff, tuning: &Tuning) -> Option<ChangeSet> {
    let WorkingTreeDiff {
        added,
        modified,
        deleted,
        renamed,
    } = diff;

    let files = added
        .into_iter()
        .chain(modified)
        .chain(deleted)
        .chain(renamed)
        .map(|file| analyze_file(&file, tuning));

    ChangeSet::from_files(files)
}

/// Categorize one file and infer its change type.
pub fn analyze_file(file: &FileDiff, tuning: &Tuning) -> FileChange {
    let category = categorize(&file.path);
    let cues = DiffCues::from_lines(
        file.additions,
        file.deletions,
        &file.added_lines,
        &file.removed_lines,
    );
    let details = describe(file, &cues);
    let ctx = ChangeContext {
        status: file.status,
        category,
        cues,
    };
    let change_type = infer_change_type_with(&ctx, tuning);

    let path = match (&file.status, &file.old_path) {
        (FileStatus::Renamed, Some(old)) => format!("{old} → {}", file.path),
        _ => file.path.clone(),
    };

    debug!(path = %path, category = %category, change_type = %change_type, "Analyzed file");
    FileChange::new(path, file.status, category, change_type, details)
}

/// Short human-readable notes about one file.
fn describe(file: &FileDiff, cues: &DiffCues) -> Vec<String> {
    let mut details = Vec::new();

    match file.status {
        FileStatus::Added => details.push("new file".to_string()),
        FileStatus::Deleted => details.push("removed file".to_string()),
        FileStatus::Renamed => match &file.old_path {
            Some(old) => details.push(format!("renamed from {old}")),
            None => details.push("renamed file".to_string()),
        },
        FileStatus::Modified => {}
    }

    if file.binary {
        details.push("binary file".to_string());
        return details;
    }

    if file.additions > 0 || file.deletions > 0 {
        details.push(format!("+{} -{} lines", file.additions, file.deletions));
    }

    if file.status == FileStatus::Modified && cues.whitespace_only {
        details.push("whitespace-only changes".to_string());
    }

    if !cues.new_identifiers.is_empty() {
        let mut named: Vec<String> = cues
            .new_identifiers
            .iter()
            .take(MAX_NAMED_IDENTIFIERS)
            .map(|name| format!("`{name}`"))
            .collect();
        let hidden = cues.new_identifiers.len().saturating_sub(MAX_NAMED_IDENTIFIERS);
        if hidden > 0 {
            named.push(format!("{hidden} more"));
        }
        details.push(format!("defines {}", named.join(", ")));
    }

    details
}
