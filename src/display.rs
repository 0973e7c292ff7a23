//! Plain-text change summary printed before the suggested message.

use crate::commit::{ChangeSet, FileChange};

/// Summarize a change set grouped by status.
///
/// Empty status groups are skipped. Each file line shows its category and
/// inferred change type, followed by any details.
pub fn format_changes(changes: &ChangeSet) -> String {
    let groups: [(&str, char, &[FileChange]); 4] = [
        ("Added", '+', changes.added()),
        ("Modified", '~', changes.modified()),
        ("Deleted", '-', changes.deleted()),
        ("Renamed", '>', changes.renamed()),
    ];

    let mut out = format!("Changes to be committed ({} files):\n", changes.len());
    for (title, marker, files) in groups {
        if files.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{title} ({}):\n", files.len()));
        for file in files {
            out.push_str(&format!(
                "  {marker} {} [{}, {}]",
                file.path(),
                file.category(),
                file.change_type()
            ));
            if !file.details().is_empty() {
                out.push_str(&format!(" - {}", file.details().join(", ")));
            }
            out.push('\n');
        }
    }
    out
}
