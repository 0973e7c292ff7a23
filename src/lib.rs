//! git-commit-simplifier - suggests commit messages from local git changes.
//!
//! # Overview
//!
//! The changed files of a repository are categorized by type and role, each
//! change gets a best-effort change type (feature, fix, refactor...), and the
//! resulting [`ChangeSet`] is rendered in one of three formats: a single-line
//! summary, a detailed grouped listing, or a Conventional Commits message.
//! Nothing leaves the machine and no commit is ever created.

pub mod commit;
pub mod config;
pub mod display;
pub mod error;
pub mod message;

// Re-export commonly used types
pub use commit::{Category, ChangeSet, ChangeType, FileChange, FileStatus, UnstagedPrompt, analyze};
pub use config::{CommitStyle, ConfigLookup, ConfigStore, Settings};
pub use error::{ConfigError, RepositoryError};
pub use message::{MessageRenderer, generate_commit_message};
