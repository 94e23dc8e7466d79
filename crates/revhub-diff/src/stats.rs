//! Aggregate change counts for a diff.

use serde::{Deserialize, Serialize};

use crate::model::{DiffResult, DiffStatus, FieldDiff, LineKind};

/// Insertion, deletion, and modification counts for a [`DiffResult`].
///
/// Added entries and inserted lines count as insertions, removed entries
/// and deleted lines as deletions, and modified whole values as changes.
/// Nested mappings are counted recursively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    /// Added entries plus inserted lines.
    pub insertions: usize,
    /// Removed entries plus deleted lines.
    pub deletions: usize,
    /// Modified non-text values.
    pub changes: usize,
    /// Sum of the three counts.
    pub total: usize,
    /// Top-level fields that differ, in key order.
    pub fields_changed: Vec<String>,
}

impl DiffStats {
    /// Compute stats for a diff.
    pub fn from_diff(diff: &DiffResult) -> Self {
        let mut stats = Self::default();
        for (name, field) in &diff.fields {
            if field.is_changed() {
                stats.fields_changed.push(name.clone());
            }
            stats.count(field);
        }
        stats.total = stats.insertions + stats.deletions + stats.changes;
        stats
    }

    /// Whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Short human summary, e.g. `2 additions, 1 modification`.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "No changes".to_string();
        }
        let parts = [
            (self.insertions, "addition", "additions"),
            (self.deletions, "deletion", "deletions"),
            (self.changes, "modification", "modifications"),
        ];
        parts
            .iter()
            .filter(|(count, _, _)| *count > 0)
            .map(|(count, one, many)| {
                format!("{count} {}", if *count == 1 { one } else { many })
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn count(&mut self, field: &FieldDiff) {
        match field {
            FieldDiff::Value { status, .. } => match status {
                DiffStatus::Added => self.insertions += 1,
                DiffStatus::Removed => self.deletions += 1,
                DiffStatus::Modified => self.changes += 1,
                DiffStatus::Unchanged => {}
            },
            FieldDiff::Nested { fields, .. } => {
                for nested in fields.values() {
                    self.count(nested);
                }
            }
            FieldDiff::Text { lines, .. } => {
                for line in lines {
                    match line.kind {
                        LineKind::Insert => self.insertions += 1,
                        LineKind::Delete => self.deletions += 1,
                        LineKind::Equal => {}
                    }
                }
            }
        }
    }
}
