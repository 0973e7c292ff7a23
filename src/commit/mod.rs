//! Change analysis: categorize changed files and infer their change types.

pub mod analyzer;
pub mod category;
pub mod change_set;
pub mod diff;
pub mod heuristic;

pub use analyzer::{FixedAnswer, UnstagedPrompt, analyze, analyze_repository, build_change_set};
pub use category::{Category, categorize};
pub use change_set::{ChangeSet, FileChange};
pub use diff::{
    FileDiff, FileStatus, WorkingTreeDiff, collect_diff, count_unstaged, open_repository,
};
pub use heuristic::{ChangeContext, ChangeType, DiffCues, Tuning, infer_change_type};
