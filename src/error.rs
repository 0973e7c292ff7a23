//! Error types for git-commit-simplifier modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from opening or diffing the repository.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Not a valid git repository: {0}")]
    Open(#[source] git2::Error),

    #[error("Repository has no working directory (bare repository)")]
    Bare,

    #[error("Failed to collect diff: {0}")]
    Diff(#[source] git2::Error),
}

/// Errors from reading, writing or interpreting settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write settings file {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {message}")]
    ParseFailed { path: PathBuf, message: String },

    #[error("Invalid value for '{key}': {value}")]
    InvalidValue { key: String, value: String },

    #[error("Could not determine the home directory for the settings file")]
    NoHomeDirectory,
}
