//! Change-type inference.
//!
//! Best-effort: the label is guessed from the file's status, its category and
//! a few cues pulled from the diff lines. Rules are evaluated in a fixed order
//! and the first match wins.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::Serialize;

use super::category::Category;
use super::diff::FileStatus;

/// Inferred intent of a single file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Feature,
    Fix,
    Refactor,
    Docs,
    Style,
    Test,
    Chore,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Refactor => "refactor",
            Self::Docs => "docs",
            Self::Style => "style",
            Self::Test => "test",
            Self::Chore => "chore",
        }
    }

    /// Emoji used by the detailed message format.
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Feature => "✨",
            Self::Fix => "🐛",
            Self::Refactor => "♻️",
            Self::Docs => "📝",
            Self::Test => "✅",
            Self::Style => "🎨",
            Self::Chore => "🔧",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feature" | "feat" => Ok(Self::Feature),
            "fix" => Ok(Self::Fix),
            "refactor" => Ok(Self::Refactor),
            "docs" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "test" => Ok(Self::Test),
            "chore" => Ok(Self::Chore),
            _ => Err(format!("Unknown change type: {}", s)),
        }
    }
}

/// Matches definition-like lines and captures the defined name.
static DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?(?:def|class|fn|function|struct|enum|trait|interface|type)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("definition pattern is valid")
});

/// Cues pulled from the added and removed lines of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffCues {
    pub additions: usize,
    pub deletions: usize,
    /// Added and removed text are identical once whitespace is dropped.
    /// Always false when the kept lines are fewer than the counted ones.
    pub whitespace_only: bool,
    /// Names defined in added lines that were not defined in removed lines.
    pub new_identifiers: Vec<String>,
}

impl DiffCues {
    pub fn from_lines(
        additions: usize,
        deletions: usize,
        added: &[String],
        removed: &[String],
    ) -> Self {
        let complete = added.len() == additions && removed.len() == deletions;
        let whitespace_only = complete
            && (additions > 0 || deletions > 0)
            && strip_whitespace(added) == strip_whitespace(removed);

        let removed_names: HashSet<String> = definitions(removed).collect();
        let mut seen = HashSet::new();
        let new_identifiers = definitions(added)
            .filter(|name| !removed_names.contains(name))
            .filter(|name| seen.insert(name.clone()))
            .collect();

        Self {
            additions,
            deletions,
            whitespace_only,
            new_identifiers,
        }
    }
}

fn strip_whitespace(lines: &[String]) -> String {
    lines
        .iter()
        .flat_map(|l| l.chars())
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn definitions(lines: &[String]) -> impl Iterator<Item = String> + '_ {
    lines.iter().filter_map(|line| {
        DEFINITION_RE
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Everything the heuristic looks at for one file.
#[derive(Debug, Clone)]
pub struct ChangeContext {
    pub status: FileStatus,
    pub category: Category,
    pub cues: DiffCues,
}

/// Knobs for the modified-file rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tuning {
    /// Deletions must exceed additions by more than this for a fix.
    pub fix_removal_margin: usize,
}

/// Condition half of a modified-file rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    WhitespaceOnly,
    TestCategory,
    DocumentationCategory,
    RemovalDominant,
}

impl Rule {
    pub fn matches(&self, ctx: &ChangeContext, tuning: &Tuning) -> bool {
        match self {
            Self::WhitespaceOnly => ctx.cues.whitespace_only,
            Self::TestCategory => ctx.category == Category::Test,
            Self::DocumentationCategory => ctx.category == Category::Documentation,
            Self::RemovalDominant => {
                ctx.cues.deletions > ctx.cues.additions + tuning.fix_removal_margin
                    && ctx.cues.new_identifiers.is_empty()
            }
        }
    }
}

/// Ordered rules for modified files; `refactor` when none match.
pub const MODIFIED_RULES: &[(Rule, ChangeType)] = &[
    (Rule::WhitespaceOnly, ChangeType::Style),
    (Rule::TestCategory, ChangeType::Test),
    (Rule::DocumentationCategory, ChangeType::Docs),
    (Rule::RemovalDominant, ChangeType::Fix),
];

/// Infer the change type with default tuning.
pub fn infer_change_type(ctx: &ChangeContext) -> ChangeType {
    infer_change_type_with(ctx, &Tuning::default())
}

pub fn infer_change_type_with(ctx: &ChangeContext, tuning: &Tuning) -> ChangeType {
    match ctx.status {
        FileStatus::Added => match ctx.category {
            Category::Test => ChangeType::Test,
            Category::Documentation => ChangeType::Docs,
            _ => ChangeType::Feature,
        },
        FileStatus::Deleted => ChangeType::Chore,
        FileStatus::Renamed => ChangeType::Refactor,
        FileStatus::Modified => MODIFIED_RULES
            .iter()
            .find(|(rule, _)| rule.matches(ctx, tuning))
            .map(|(_, change_type)| *change_type)
            .unwrap_or(ChangeType::Refactor),
    }
}
