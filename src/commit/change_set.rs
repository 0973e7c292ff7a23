//! Structured change set: files grouped by status and by category.

use std::collections::BTreeMap;

use serde::Serialize;

use super::category::Category;
use super::diff::FileStatus;
use super::heuristic::ChangeType;

/// One analyzed file. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChange {
    path: String,
    status: FileStatus,
    category: Category,
    change_type: ChangeType,
    details: Vec<String>,
}

impl FileChange {
    pub fn new(
        path: impl Into<String>,
        status: FileStatus,
        category: Category,
        change_type: ChangeType,
        details: Vec<String>,
    ) -> Self {
        Self {
            path: path.into(),
            status,
            category,
            change_type,
            details,
        }
    }

    /// Repo-relative path; `"old → new"` for renames.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status(&self) -> FileStatus {
        self.status
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn change_type(&self) -> ChangeType {
        self.change_type
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }
}

/// All file-level changes since the last commit.
///
/// Every file in the status lists appears exactly once in the bucket of its
/// category, and only categories with at least one file have a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    added: Vec<FileChange>,
    modified: Vec<FileChange>,
    deleted: Vec<FileChange>,
    renamed: Vec<FileChange>,
    categories: BTreeMap<Category, Vec<FileChange>>,
}

impl ChangeSet {
    /// Build a change set, or `None` when there are no files at all.
    ///
    /// Each file lands in the status list matching its own status.
    pub fn from_files(files: impl IntoIterator<Item = FileChange>) -> Option<Self> {
        let mut set = Self {
            added: Vec::new(),
            modified: Vec::new(),
            deleted: Vec::new(),
            renamed: Vec::new(),
            categories: BTreeMap::new(),
        };

        for file in files {
            set.categories
                .entry(file.category)
                .or_default()
                .push(file.clone());
            match file.status {
                FileStatus::Added => set.added.push(file),
                FileStatus::Modified => set.modified.push(file),
                FileStatus::Deleted => set.deleted.push(file),
                FileStatus::Renamed => set.renamed.push(file),
            }
        }

        if set.is_empty() { None } else { Some(set) }
    }

    pub fn added(&self) -> &[FileChange] {
        &self.added
    }

    pub fn modified(&self) -> &[FileChange] {
        &self.modified
    }

    pub fn deleted(&self) -> &[FileChange] {
        &self.deleted
    }

    pub fn renamed(&self) -> &[FileChange] {
        &self.renamed
    }

    /// Category buckets in category order.
    pub fn categories(&self) -> &BTreeMap<Category, Vec<FileChange>> {
        &self.categories
    }

    /// All files in status order: added, modified, deleted, renamed.
    pub fn files(&self) -> impl Iterator<Item = &FileChange> {
        self.added
            .iter()
            .chain(&self.modified)
            .chain(&self.deleted)
            .chain(&self.renamed)
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.deleted.len() + self.renamed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Category with the most files; ties go to the earlier category.
    pub fn top_category(&self) -> Option<Category> {
        self.categories
            .iter()
            .fold(None, |best: Option<(Category, usize)>, (category, files)| match best {
                Some((_, count)) if count >= files.len() => best,
                _ => Some((*category, files.len())),
            })
            .map(|(category, _)| category)
    }
}
