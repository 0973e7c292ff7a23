//! Commit message rendering.
//!
//! Three interchangeable formats share one contract: a [`ChangeSet`] plus
//! [`Settings`] in, a message string out. Rendering is pure, so the same
//! input always yields the same message.

pub mod conventional;
pub mod detailed;
pub mod simple;

use crate::commit::{ChangeSet, ChangeType, FileChange, FileStatus};
use crate::config::{CommitStyle, Settings};

pub use conventional::{
    ConventionalCommit, ConventionalType, convert_to_conventional,
    generate_conventional_commit_message,
};
pub use detailed::DetailedRenderer;
pub use simple::SimpleRenderer;

/// A commit message format.
pub trait MessageRenderer {
    fn render(&self, changes: &ChangeSet, settings: &Settings) -> String;
}

/// Format backed by [`generate_conventional_commit_message`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionalRenderer;

impl MessageRenderer for ConventionalRenderer {
    fn render(&self, changes: &ChangeSet, _settings: &Settings) -> String {
        generate_conventional_commit_message(changes)
    }
}

/// Renderer for a commit style.
pub fn renderer_for(style: CommitStyle) -> &'static dyn MessageRenderer {
    match style {
        CommitStyle::Simple => &SimpleRenderer,
        CommitStyle::Detailed => &DetailedRenderer,
        CommitStyle::Conventional => &ConventionalRenderer,
    }
}

/// Render `changes` in the style selected by `settings`.
pub fn generate_commit_message(changes: &ChangeSet, settings: &Settings) -> String {
    renderer_for(settings.commit_style).render(changes, settings)
}

/// One-line summary shared by the simple and detailed formats.
///
/// A single file reads `"<Verb> <file>"`; several read
/// `"Update N files in <top category>"` with a note on other categories.
pub(crate) fn summary_subject(changes: &ChangeSet) -> String {
    let mut files = changes.files();
    if let (Some(only), None) = (files.next(), files.next()) {
        return format!("{} {}", verb(only), display_name(only));
    }

    let total = changes.len();
    let Some(top) = changes.top_category() else {
        return format!("Update {total} files");
    };

    let mut subject = format!("Update {total} files in {top}");
    let others = changes.categories().len().saturating_sub(1);
    if others > 0 {
        let noun = if others == 1 { "category" } else { "categories" };
        subject.push_str(&format!(" and {others} other {noun}"));
    }
    subject
}

/// Cut `subject` to at most `max_len` characters, ending in `...` when cut.
pub(crate) fn truncate_subject(subject: &str, max_len: usize) -> String {
    const ELLIPSIS: &str = "...";

    if subject.chars().count() <= max_len {
        return subject.to_string();
    }
    if max_len <= ELLIPSIS.len() {
        return subject.chars().take(max_len).collect();
    }

    let kept: String = subject.chars().take(max_len - ELLIPSIS.len()).collect();
    format!("{}{}", kept.trim_end(), ELLIPSIS)
}

fn verb(file: &FileChange) -> &'static str {
    match file.status() {
        FileStatus::Added => "Add",
        FileStatus::Deleted => "Remove",
        FileStatus::Renamed => "Rename",
        FileStatus::Modified => match file.change_type() {
            ChangeType::Fix => "Fix",
            ChangeType::Refactor => "Refactor",
            ChangeType::Style => "Format",
            ChangeType::Feature | ChangeType::Docs | ChangeType::Test | ChangeType::Chore => {
                "Update"
            }
        },
    }
}

/// File name for plain paths, the full `old → new` text for renames.
fn display_name(file: &FileChange) -> &str {
    if file.status() == FileStatus::Renamed {
        return file.path();
    }
    file.path().rsplit('/').next().unwrap_or(file.path())
}
