//! Plain-text rendering of a diff for terminals and logs.

use std::fmt::Write;

use serde_json::Value;

use crate::model::{DiffResult, DiffStatus, FieldDiff, LineKind};
use crate::stats::DiffStats;

/// Render a diff as a summary line followed by one entry per changed field.
///
/// Markers: `+` added, `-` removed, `~` modified. Text fields list their
/// changed lines; nested mappings are indented under their parent.
pub fn render(diff: &DiffResult) -> String {
    let stats = DiffStats::from_diff(diff);
    let mut out = format!(
        "{} ({:.1}% similar)\n",
        stats.summary(),
        diff.similarity_percentage
    );
    for (name, field) in &diff.fields {
        render_field(&mut out, name, field, 0);
    }
    out
}

fn render_field(out: &mut String, name: &str, field: &FieldDiff, depth: usize) {
    if !field.is_changed() {
        return;
    }
    let indent = "  ".repeat(depth);
    let marker = marker(field.status());

    // Writing to a String cannot fail.
    match field {
        FieldDiff::Value { old, new, .. } => {
            let _ = match field.status() {
                DiffStatus::Added => writeln!(out, "{indent}{marker} {name}: {}", show(new)),
                DiffStatus::Removed => writeln!(out, "{indent}{marker} {name}: {}", show(old)),
                _ => writeln!(out, "{indent}{marker} {name}: {} -> {}", show(old), show(new)),
            };
        }
        FieldDiff::Nested { fields, .. } => {
            let _ = writeln!(out, "{indent}{marker} {name}:");
            for (child, diff) in fields {
                render_field(out, child, diff, depth + 1);
            }
        }
        FieldDiff::Text { lines, .. } => {
            let _ = writeln!(out, "{indent}{marker} {name}:");
            for line in lines {
                let sign = match line.kind {
                    LineKind::Insert => '+',
                    LineKind::Delete => '-',
                    LineKind::Equal => continue,
                };
                let _ = writeln!(out, "{indent}    {sign} {}", line.content);
            }
        }
    }
}

fn marker(status: DiffStatus) -> char {
    match status {
        DiffStatus::Added => '+',
        DiffStatus::Removed => '-',
        DiffStatus::Modified | DiffStatus::Unchanged => '~',
    }
}

fn show(value: &Option<Value>) -> String {
    value
        .as_ref()
        .map_or_else(|| "null".to_string(), Value::to_string)
}
