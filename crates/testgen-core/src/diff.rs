//! Unified diff generation for derived snapshots.
//!
//! Documents added by an action are rendered as new-file diffs against
//! `/dev/null`, compatible with `git apply`.

use crate::text::line_count;
use crate::workspace::{Project, WorkspaceSnapshot};

/// Generate a unified diff that creates `path` with `text`.
pub fn generate_new_file_diff(path: &str, text: &str) -> String {
    let mut diff = String::new();
    diff.push_str("--- /dev/null\n");
    diff.push_str(&format!("+++ b/{}\n", path));

    let lines = line_count(text);
    if lines == 0 {
        return diff;
    }

    diff.push_str(&format!("@@ -0,0 +1,{} @@\n", lines));
    for line in text.lines() {
        diff.push('+');
        diff.push_str(line);
        diff.push('\n');
    }
    if !text.ends_with('\n') {
        diff.push_str("\\ No newline at end of file\n");
    }
    diff
}

/// Generate a unified diff for every document `derived` adds on top of `base`.
///
/// Paths are workspace-relative: `path_of` maps a project and a document
/// path relative to that project to the path shown in the diff header.
pub fn generate_snapshot_diff(
    base: &WorkspaceSnapshot,
    derived: &WorkspaceSnapshot,
    path_of: impl Fn(&Project, &str) -> String,
) -> String {
    derived
        .added_documents(base)
        .into_iter()
        .map(|(project, document)| {
            let path = path_of(project, &document.relative_path());
            generate_new_file_diff(&path, document.text())
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
