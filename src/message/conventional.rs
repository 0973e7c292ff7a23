//! Conventional Commits formatting.
//!
//! Messages follow `<type>[(<scope>)][!]: <description>` with optional body
//! and footer blocks separated by blank lines.

use std::collections::BTreeMap;
use std::fmt;

use crate::commit::{Category, ChangeSet, ChangeType, FileChange};

/// Conventional commit type. Declaration order is the tie-break priority
/// when picking the primary type of a change set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConventionalType {
    Feat,
    Fix,
    Refactor,
    Docs,
    Style,
    Test,
    Chore,
    Build,
}

impl ConventionalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feat => "feat",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Test => "test",
            Self::Chore => "chore",
            Self::Build => "build",
        }
    }
}

impl fmt::Display for ConventionalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ChangeType> for ConventionalType {
    fn from(change_type: ChangeType) -> Self {
        match change_type {
            ChangeType::Feature => Self::Feat,
            ChangeType::Fix => Self::Fix,
            ChangeType::Refactor => Self::Refactor,
            ChangeType::Docs => Self::Docs,
            ChangeType::Style => Self::Style,
            ChangeType::Test => Self::Test,
            ChangeType::Chore => Self::Chore,
        }
    }
}

/// A conventional commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConventionalCommit {
    pub commit_type: ConventionalType,
    pub scope: Option<String>,
    pub breaking: bool,
    pub description: String,
    pub body: Option<String>,
    pub footer: Option<String>,
}

impl ConventionalCommit {
    pub fn new(commit_type: ConventionalType, description: impl Into<String>) -> Self {
        Self {
            commit_type,
            scope: None,
            breaking: false,
            description: description.into(),
            body: None,
            footer: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_breaking(mut self, breaking: bool) -> Self {
        self.breaking = breaking;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Render the message. Blank body or footer blocks are left out.
    pub fn format(&self) -> String {
        let mut message = self.commit_type.as_str().to_string();
        if let Some(scope) = self.scope.as_deref().filter(|s| !s.is_empty()) {
            message.push_str(&format!("({scope})"));
        }
        if self.breaking {
            message.push('!');
        }
        message.push_str(": ");
        message.push_str(&self.description);

        for block in [&self.body, &self.footer] {
            if let Some(text) = block.as_deref().filter(|t| !t.trim().is_empty()) {
                message.push_str("\n\n");
                message.push_str(text);
            }
        }
        message
    }
}

impl fmt::Display for ConventionalCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

/// Map a primary change type and the category buckets to a commit type,
/// an optional scope and a description.
///
/// One category becomes the scope; several leave the scope empty and the
/// description mentions "multiple categories".
pub fn convert_to_conventional(
    primary: ChangeType,
    categories: &BTreeMap<Category, Vec<FileChange>>,
) -> (ConventionalType, Option<String>, String) {
    let only = match categories.len() {
        1 => categories.keys().next().copied(),
        _ => None,
    };

    let commit_type = match (ConventionalType::from(primary), only) {
        (ConventionalType::Chore, Some(Category::Build)) => ConventionalType::Build,
        (other, _) => other,
    };

    let description = match (only, categories.len()) {
        (Some(category), _) => single_description(commit_type, category.as_str()),
        (None, 0) => generic_description(commit_type).to_string(),
        (None, _) => multiple_description(commit_type).to_string(),
    };

    (commit_type, only.map(|c| c.as_str().to_string()), description)
}

fn single_description(commit_type: ConventionalType, category: &str) -> String {
    match commit_type {
        ConventionalType::Feat => format!("add new {category} functionality"),
        ConventionalType::Fix => format!("resolve issues in {category}"),
        ConventionalType::Refactor => format!("restructure {category} code"),
        ConventionalType::Docs => format!("update {category}"),
        ConventionalType::Style => format!("improve {category} formatting"),
        ConventionalType::Test => format!("update {category} files"),
        ConventionalType::Chore => format!("clean up {category} files"),
        ConventionalType::Build => format!("update {category} files"),
    }
}

fn multiple_description(commit_type: ConventionalType) -> &'static str {
    match commit_type {
        ConventionalType::Feat => "add new functionality across multiple categories",
        ConventionalType::Fix => "resolve issues across multiple categories",
        ConventionalType::Refactor => "restructure code across multiple categories",
        ConventionalType::Docs => "update documentation across multiple categories",
        ConventionalType::Style => "improve formatting across multiple categories",
        ConventionalType::Test => "update tests across multiple categories",
        ConventionalType::Chore => "clean up files across multiple categories",
        ConventionalType::Build => "update build files across multiple categories",
    }
}

fn generic_description(commit_type: ConventionalType) -> &'static str {
    match commit_type {
        ConventionalType::Feat => "add new functionality",
        ConventionalType::Fix => "resolve issues",
        ConventionalType::Refactor => "restructure code",
        ConventionalType::Docs => "update documentation",
        ConventionalType::Style => "improve formatting",
        ConventionalType::Test => "update tests",
        ConventionalType::Chore => "clean up files",
        ConventionalType::Build => "update build files",
    }
}

/// Most frequent change type; ties go to the higher-priority commit type.
fn primary_change_type(changes: &ChangeSet) -> ChangeType {
    let mut counts: Vec<(ChangeType, usize)> = Vec::new();
    for file in changes.files() {
        match counts.iter_mut().find(|(t, _)| *t == file.change_type()) {
            Some((_, count)) => *count += 1,
            None => counts.push((file.change_type(), 1)),
        }
    }

    counts
        .into_iter()
        .min_by_key(|(change_type, count)| {
            (std::cmp::Reverse(*count), ConventionalType::from(*change_type))
        })
        .map(|(change_type, _)| change_type)
        .unwrap_or(ChangeType::Chore)
}

fn body(categories: &BTreeMap<Category, Vec<FileChange>>) -> String {
    categories
        .iter()
        .map(|(category, files)| {
            let mut block = format!("{category}:");
            for file in files {
                block.push_str("\n- ");
                block.push_str(file.path());
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Conventional commit message for a whole change set.
///
/// Breaking changes are never inferred and no footer is produced.
pub fn generate_conventional_commit_message(changes: &ChangeSet) -> String {
    let primary = primary_change_type(changes);
    let (commit_type, scope, description) = convert_to_conventional(primary, changes.categories());

    let mut commit =
        ConventionalCommit::new(commit_type, description).with_body(body(changes.categories()));
    if let Some(scope) = scope {
        commit = commit.with_scope(scope);
    }
    commit.format()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::FileStatus;
    use crate::message::test_support::{file, python_pair};

    fn buckets(entries: &[(Category, &[&str])]) -> BTreeMap<Category, Vec<FileChange>> {
        entries
            .iter()
            .map(|(category, paths)| {
                let files = paths
                    .iter()
                    .map(|p| {
                        FileChange::new(
                            *p,
                            FileStatus::Modified,
                            *category,
                            ChangeType::Refactor,
                            vec![],
                        )
                    })
                    .collect();
                (*category, files)
            })
            .collect()
    }

    #[test]
    fn test_format_basic() {
        let commit = ConventionalCommit::new(ConventionalType::Feat, "add new feature");
        assert_eq!(commit.format(), "feat: add new feature");
    }

    #[test]
    fn test_format_with_scope() {
        let commit = ConventionalCommit::new(ConventionalType::Fix, "resolve button alignment")
            .with_scope("ui");
        assert_eq!(commit.format(), "fix(ui): resolve button alignment");
    }

    #[test]
    fn test_format_breaking() {
        let commit =
            ConventionalCommit::new(ConventionalType::Refactor, "change API response format")
                .with_breaking(true);
        assert_eq!(commit.format(), "refactor!: change API response format");
    }

    #[test]
    fn test_format_with_body() {
        let commit = ConventionalCommit::new(ConventionalType::Docs, "update README")
            .with_body("Add installation instructions and examples.");
        assert_eq!(
            commit.format(),
            "docs: update README\n\nAdd installation instructions and examples."
        );
    }

    #[test]
    fn test_format_with_footer() {
        let commit = ConventionalCommit::new(ConventionalType::Feat, "add user authentication")
            .with_footer("Closes #123");
        assert_eq!(commit.format(), "feat: add user authentication\n\nCloses #123");
    }

    #[test]
    fn test_format_complete() {
        let commit = ConventionalCommit::new(ConventionalType::Feat, "implement OAuth2")
            .with_scope("auth")
            .with_breaking(true)
            .with_body("This adds OAuth2 authentication support.")
            .with_footer(
                "BREAKING CHANGE: Previous authentication methods are no longer supported.\n\
                 Closes #456",
            );
        assert_eq!(
            commit.to_string(),
            "feat(auth)!: implement OAuth2\n\n\
             This adds OAuth2 authentication support.\n\n\
             BREAKING CHANGE: Previous authentication methods are no longer supported.\nCloses #456"
        );
    }

    #[test]
    fn test_blank_body_and_footer_are_absent() {
        let commit = ConventionalCommit::new(ConventionalType::Chore, "tidy")
            .with_body("   ")
            .with_footer("");
        assert_eq!(commit.format(), "chore: tidy");
    }

    #[test]
    fn test_convert_single_category() {
        let python = buckets(&[(Category::Python, &["app.py"])]);
        let (kind, scope, description) = convert_to_conventional(ChangeType::Feature, &python);
        assert_eq!(kind, ConventionalType::Feat);
        assert_eq!(scope.as_deref(), Some("python"));
        assert!(description.contains("python"));

        let (kind, scope, description) = convert_to_conventional(
            ChangeType::Fix,
            &buckets(&[(Category::Ui, &["button.html", "form.html"])]),
        );
        assert_eq!(kind, ConventionalType::Fix);
        assert_eq!(scope.as_deref(), Some("ui"));
        assert!(description.contains("ui"));
    }

    #[test]
    fn test_convert_multiple_categories() {
        let (kind, scope, description) = convert_to_conventional(
            ChangeType::Refactor,
            &buckets(&[(Category::Python, &["app.py"]), (Category::Ui, &["button.html"])]),
        );
        assert_eq!(kind, ConventionalType::Refactor);
        assert_eq!(scope, None);
        assert!(description.contains("multiple"));
    }

    #[test]
    fn test_convert_build_only_chore_is_build() {
        let build = buckets(&[(Category::Build, &["Cargo.toml"])]);
        let (kind, scope, _) = convert_to_conventional(ChangeType::Chore, &build);
        assert_eq!(kind, ConventionalType::Build);
        assert_eq!(scope.as_deref(), Some("build"));

        let (kind, _, _) = convert_to_conventional(
            ChangeType::Chore,
            &buckets(&[(Category::Build, &["Cargo.toml"]), (Category::Rust, &["lib.rs"])]),
        );
        assert_eq!(kind, ConventionalType::Chore);
    }

    #[test]
    fn test_convert_no_categories() {
        let (kind, scope, description) =
            convert_to_conventional(ChangeType::Docs, &BTreeMap::new());
        assert_eq!(kind, ConventionalType::Docs);
        assert_eq!(scope, None);
        assert_eq!(description, "update documentation");
    }

    #[test]
    fn test_generate_from_change_set() {
        let message = generate_conventional_commit_message(&python_pair());
        assert!(message.starts_with("feat") || message.starts_with("fix"));
        assert!(message.contains(':'));
        assert!(message.contains("(python)"));
        assert!(message.contains("new.py"));
        assert!(message.contains("test.py"));
    }

    #[test]
    fn test_generate_tie_prefers_feat() {
        let message = generate_conventional_commit_message(&python_pair());
        assert_eq!(
            message,
            "feat(python): add new python functionality\n\npython:\n- new.py\n- test.py"
        );
    }

    #[test]
    fn test_generate_picks_most_frequent_type() {
        let set = ChangeSet::from_files(vec![
            file("a.py", FileStatus::Added, ChangeType::Feature),
            file("b.py", FileStatus::Modified, ChangeType::Fix),
            file("c.py", FileStatus::Modified, ChangeType::Fix),
        ])
        .unwrap();
        let message = generate_conventional_commit_message(&set);
        assert!(message.starts_with("fix(python): resolve issues in python"));
    }

    #[test]
    fn test_generate_multiple_categories_has_no_scope() {
        let set = ChangeSet::from_files(vec![
            file("app.py", FileStatus::Modified, ChangeType::Refactor),
            file("README.md", FileStatus::Modified, ChangeType::Refactor),
        ])
        .unwrap();
        let message = generate_conventional_commit_message(&set);
        assert_eq!(
            message,
            "refactor: restructure code across multiple categories\n\n\
             documentation:\n- README.md\n\npython:\n- app.py"
        );
    }

    #[test]
    fn test_generate_is_deterministic() {
        let set = python_pair();
        assert_eq!(
            generate_conventional_commit_message(&set),
            generate_conventional_commit_message(&set)
        );
    }
}
