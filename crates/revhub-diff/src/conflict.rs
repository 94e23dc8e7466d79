//! Three-way conflict detection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A top-level field both sides changed differently relative to a common base.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConflict {
    /// Field name.
    pub field: String,
    /// Value at the common base, `None` when absent.
    pub base: Option<Value>,
    /// Value on our side.
    pub ours: Option<Value>,
    /// Value on their side.
    pub theirs: Option<Value>,
}

/// Find fields changed on both sides to different values.
///
/// A field changed on only one side, or changed identically on both, is
/// not a conflict. Results are ordered by field name.
pub fn detect_conflicts(
    base: &Map<String, Value>,
    ours: &Map<String, Value>,
    theirs: &Map<String, Value>,
) -> Vec<FieldConflict> {
    let keys: BTreeSet<&String> = base
        .keys()
        .chain(ours.keys())
        .chain(theirs.keys())
        .collect();

    keys.into_iter()
        .filter_map(|key| {
            let (b, o, t) = (base.get(key), ours.get(key), theirs.get(key));
            (o != b && t != b && o != t).then(|| FieldConflict {
                field: key.clone(),
                base: b.cloned(),
                ours: o.cloned(),
                theirs: t.cloned(),
            })
        })
        .collect()
}
