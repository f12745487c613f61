//! Unified diff rendering for [`DiffTuple`]s.

use similar::TextDiff;

use crate::operation::DiffTuple;

/// Unified diff between `previous` and `new` for `path`.
///
/// A missing side is treated as an empty file, so creates show every line
/// added and deletes show every known line removed.
pub fn unified_diff(previous: Option<&str>, new: Option<&str>, path: &str) -> String {
    let old = normalize_line_endings(previous.unwrap_or_default());
    let new = normalize_line_endings(new.unwrap_or_default());
    let old_header = format!("a/{path}");
    let new_header = format!("b/{path}");
    TextDiff::from_lines(&old, &new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}

/// Unified diff of one tuple.
pub fn tuple_diff(tuple: &DiffTuple) -> String {
    unified_diff(
        tuple.previous_content.as_deref(),
        tuple.new_content.as_deref(),
        &tuple.path,
    )
}

fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}
