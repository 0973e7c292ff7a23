//! Multi-line message format: subject, blank line, files grouped by category.

use crate::commit::{ChangeSet, FileChange};
use crate::config::Settings;

use super::{MessageRenderer, summary_subject, truncate_subject};

/// Subject line plus a bulleted body listing every file with its change type.
///
/// ```text
/// Update 2 files in python
///
/// python:
/// - new.py (feature): new file
/// - test.py (fix): +1 -3 lines
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DetailedRenderer;

impl MessageRenderer for DetailedRenderer {
    fn render(&self, changes: &ChangeSet, settings: &Settings) -> String {
        let subject = summary_subject(changes).replace(['\n', '\r'], " ");
        let mut lines = vec![truncate_subject(&subject, settings.max_subject_length)];

        for (category, files) in changes.categories() {
            lines.push(String::new());
            lines.push(format!("{category}:"));
            lines.extend(files.iter().map(|f| bullet(f, settings.emoji)));
        }

        lines.join("\n")
    }
}

fn bullet(file: &FileChange, emoji: bool) -> String {
    let mut line = String::from("- ");
    if emoji {
        line.push_str(file.change_type().emoji());
        line.push(' ');
    }
    line.push_str(&format!("{} ({})", file.path(), file.change_type()));
    if !file.details().is_empty() {
        line.push_str(": ");
        line.push_str(&file.details().join(", "));
    }
    line
}
