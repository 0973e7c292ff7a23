//! File categorization by path and extension.

use std::fmt;

use serde::Serialize;

/// Coarse role of a changed file.
///
/// Declaration order is the order categories are listed in messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Test,
    Documentation,
    Build,
    Configuration,
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Go,
    Java,
    Style,
    Ui,
    Database,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Documentation => "documentation",
            Self::Build => "build",
            Self::Configuration => "configuration",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
            Self::Style => "style",
            Self::Ui => "ui",
            Self::Database => "database",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const TEST_DIRS: &[&str] = &["test", "tests", "spec", "specs", "__tests__"];
const TEST_STEM_SUFFIXES: &[&str] = &["_test", ".test", "_spec", ".spec"];
const DOC_EXTENSIONS: &[&str] = &["md", "rst", "adoc"];
const BUILD_FILES: &[&str] = &[
    "setup.py",
    "makefile",
    "dockerfile",
    "package.json",
    "cmakelists.txt",
    "requirements.txt",
    "cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "poetry.lock",
];
const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "ini", "cfg", "conf", "env", "json"];
const STYLE_EXTENSIONS: &[&str] = &["css", "scss", "sass", "less"];
const UI_EXTENSIONS: &[&str] = &["html", "htm", "vue", "svelte"];

/// Map a repo-relative path to its category.
///
/// Rules are checked in a fixed order and the first match wins, so
/// `tests/test_app.py` is `test` rather than `python`.
pub fn categorize(path: &str) -> Category {
    let normalized = path.replace('\\', "/").to_lowercase();
    let segments: Vec<&str> = normalized.split('/').filter(|s| !s.is_empty()).collect();
    let Some((file_name, dirs)) = segments.split_last() else {
        return Category::Other;
    };
    let (stem, ext) = split_extension(file_name);

    if is_test(dirs, stem) {
        return Category::Test;
    }

    if file_name.starts_with("readme")
        || DOC_EXTENSIONS.contains(&ext)
        || matches!(segments.first(), Some(&"docs" | &"doc"))
    {
        return Category::Documentation;
    }

    if BUILD_FILES.contains(file_name) || ext == "toml" {
        return Category::Build;
    }

    if CONFIG_EXTENSIONS.contains(&ext) || *file_name == ".env" || file_name.starts_with(".env.") {
        return Category::Configuration;
    }

    if let Some(language) = language_for(ext) {
        return language;
    }

    if STYLE_EXTENSIONS.contains(&ext) {
        return Category::Style;
    }

    if UI_EXTENSIONS.contains(&ext) {
        return Category::Ui;
    }

    if ext == "sql" || dirs.contains(&"migrations") {
        return Category::Database;
    }

    Category::Other
}

fn is_test(dirs: &[&str], stem: &str) -> bool {
    dirs.iter().any(|d| TEST_DIRS.contains(d))
        || stem.starts_with("test_")
        || TEST_STEM_SUFFIXES.iter().any(|s| stem.ends_with(s))
}

fn language_for(ext: &str) -> Option<Category> {
    let category = match ext {
        "py" => Category::Python,
        "js" | "jsx" | "mjs" | "cjs" => Category::JavaScript,
        "ts" | "tsx" => Category::TypeScript,
        "rs" => Category::Rust,
        "go" => Category::Go,
        "java" | "kt" => Category::Java,
        _ => return None,
    };
    Some(category)
}

/// Split `name.ext` at the last dot. Dotfiles like `.env` have no extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(idx) => (&file_name[..idx], &file_name[idx + 1..]),
    }
}
