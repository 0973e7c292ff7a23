//! Single-line message format.

use crate::commit::ChangeSet;
use crate::config::Settings;

use super::{MessageRenderer, summary_subject, truncate_subject};

/// One line, no newline, at most `max_subject_length` characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl MessageRenderer for SimpleRenderer {
    fn render(&self, changes: &ChangeSet, settings: &Settings) -> String {
        let subject = summary_subject(changes).replace(['\n', '\r'], " ");
        truncate_subject(&subject, settings.max_subject_length)
    }
}
