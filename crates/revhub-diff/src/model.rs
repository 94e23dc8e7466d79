//! Diff result types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The status of a field in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    /// Present only in the new snapshot.
    Added,
    /// Present only in the old snapshot.
    Removed,
    /// Present in both with different values.
    Modified,
    /// Present in both and deep-equal.
    Unchanged,
}

impl DiffStatus {
    /// String representation for display and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a line-level operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Line present on both sides.
    Equal,
    /// Line only in the new text.
    Insert,
    /// Line only in the old text.
    Delete,
}

/// One aligned line of a text diff. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineOp {
    /// Operation kind.
    pub kind: LineKind,
    /// Line number in the old text, absent for inserts.
    pub old_line: Option<usize>,
    /// Line number in the new text, absent for deletes.
    pub new_line: Option<usize>,
    /// The line's text, without the trailing newline.
    pub content: String,
}

/// Change descriptor for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDiff {
    /// Whole-value comparison. `old` is `None` for added fields and
    /// `new` is `None` for removed ones.
    Value {
        status: DiffStatus,
        old: Option<Value>,
        new: Option<Value>,
    },
    /// Two mappings that differ, compared key by key.
    Nested {
        status: DiffStatus,
        fields: BTreeMap<String, FieldDiff>,
    },
    /// A designated long-text field compared line by line.
    Text {
        status: DiffStatus,
        old: String,
        new: String,
        lines: Vec<LineOp>,
    },
}

impl FieldDiff {
    /// The field's overall status.
    pub fn status(&self) -> DiffStatus {
        match self {
            Self::Value { status, .. } | Self::Nested { status, .. } | Self::Text { status, .. } => {
                *status
            }
        }
    }

    /// Whether anything differs in this field.
    pub fn is_changed(&self) -> bool {
        self.status() != DiffStatus::Unchanged
    }
}

/// The structured difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Per-field change descriptors, keyed by field name.
    pub fields: BTreeMap<String, FieldDiff>,
    /// Share of unchanged compared units, 0–100 with one decimal.
    pub similarity_percentage: f64,
}

impl DiffResult {
    /// Look up one field's descriptor.
    pub fn field(&self, name: &str) -> Option<&FieldDiff> {
        self.fields.get(name)
    }

    /// Names of top-level fields whose status is not `unchanged`.
    pub fn changed_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(_, diff)| diff.is_changed())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Whether the two snapshots were deep-equal.
    pub fn is_identical(&self) -> bool {
        self.fields.values().all(|diff| !diff.is_changed())
    }
}
