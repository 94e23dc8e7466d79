//! Structural snapshot comparison.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use revhub_core::config::DiffConfig;
use revhub_core::error::AppError;
use revhub_core::result::AppResult;

use crate::model::{DiffResult, DiffStatus, FieldDiff};
use crate::stats::DiffStats;
use crate::text;

/// Compares two data snapshots field by field.
///
/// Stateless apart from its configuration; one engine is built at the
/// application boundary and shared.
#[derive(Debug, Clone, Default)]
pub struct DiffEngine {
    config: DiffConfig,
}

/// Compared units of a subtree: `(total, unchanged)`.
type Units = (usize, usize);

impl DiffEngine {
    /// Creates a diff engine with the given settings.
    pub fn new(config: DiffConfig) -> Self {
        Self { config }
    }

    /// The engine's settings.
    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare `old` against `new`.
    ///
    /// Fails with a validation error when either snapshot nests deeper
    /// than `max_depth` or a text field exceeds `max_text_bytes`.
    pub fn compare(&self, old: &Map<String, Value>, new: &Map<String, Value>) -> AppResult<DiffResult> {
        self.ensure_depth("old", old)?;
        self.ensure_depth("new", new)?;

        let (fields, (total, unchanged)) = self.compare_maps(old, new)?;
        Ok(DiffResult {
            fields,
            similarity_percentage: similarity(total, unchanged),
        })
    }

    /// Insertion, deletion, and change counts for a diff.
    pub fn diff_stats(diff: &DiffResult) -> DiffStats {
        DiffStats::from_diff(diff)
    }

    fn compare_maps(
        &self,
        old: &Map<String, Value>,
        new: &Map<String, Value>,
    ) -> AppResult<(BTreeMap<String, FieldDiff>, Units)> {
        let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
        let mut fields = BTreeMap::new();
        let (mut total, mut unchanged) = (0, 0);

        for key in keys {
            let (diff, (t, u)) = self.compare_field(key, old.get(key), new.get(key))?;
            total += t;
            unchanged += u;
            fields.insert(key.clone(), diff);
        }

        Ok((fields, (total, unchanged)))
    }

    fn compare_field(
        &self,
        key: &str,
        old: Option<&Value>,
        new: Option<&Value>,
    ) -> AppResult<(FieldDiff, Units)> {
        match (old, new) {
            (None, None) => Ok((value_diff(DiffStatus::Unchanged, None, None), (0, 0))),
            (None, Some(new)) => Ok((value_diff(DiffStatus::Added, None, Some(new)), (1, 0))),
            (Some(old), None) => Ok((value_diff(DiffStatus::Removed, Some(old), None), (1, 0))),
            (Some(Value::String(old)), Some(Value::String(new))) if self.config.is_text_field(key) => {
                self.compare_text(key, old, new)
            }
            (Some(old), Some(new)) if old == new => {
                Ok((value_diff(DiffStatus::Unchanged, Some(old), Some(new)), (1, 1)))
            }
            (Some(Value::Object(old)), Some(Value::Object(new))) => {
                let (fields, units) = self.compare_maps(old, new)?;
                Ok((
                    FieldDiff::Nested {
                        status: DiffStatus::Modified,
                        fields,
                    },
                    units,
                ))
            }
            (Some(old), Some(new)) => {
                Ok((value_diff(DiffStatus::Modified, Some(old), Some(new)), (1, 0)))
            }
        }
    }

    fn compare_text(&self, key: &str, old: &str, new: &str) -> AppResult<(FieldDiff, Units)> {
        let limit = self.config.max_text_bytes;
        if old.len() > limit || new.len() > limit {
            return Err(AppError::validation(format!(
                "Field '{key}' exceeds the {limit}-byte limit for text comparison"
            )));
        }

        let lines = text::diff_lines(old, new);
        let units = text::line_units(old, new, &lines);
        let status = if old == new {
            DiffStatus::Unchanged
        } else {
            DiffStatus::Modified
        };

        Ok((
            FieldDiff::Text {
                status,
                old: old.to_string(),
                new: new.to_string(),
                lines,
            },
            units,
        ))
    }

    /// Reject snapshots nested deeper than the configured bound.
    ///
    /// Walks iteratively so arbitrarily deep input cannot exhaust the stack.
    fn ensure_depth(&self, side: &str, snapshot: &Map<String, Value>) -> AppResult<()> {
        let max = self.config.max_depth;
        let mut stack: Vec<(&Value, usize)> = snapshot.values().map(|v| (v, 1)).collect();

        while let Some((value, depth)) = stack.pop() {
            if depth > max {
                return Err(AppError::validation(format!(
                    "The {side} snapshot nests deeper than {max} levels"
                )));
            }
            match value {
                Value::Object(map) => stack.extend(map.values().map(|v| (v, depth + 1))),
                Value::Array(items) => stack.extend(items.iter().map(|v| (v, depth + 1))),
                _ => {}
            }
        }
        Ok(())
    }
}

fn value_diff(status: DiffStatus, old: Option<&Value>, new: Option<&Value>) -> FieldDiff {
    FieldDiff::Value {
        status,
        old: old.cloned(),
        new: new.cloned(),
    }
}

/// Unchanged share in percent, one decimal. No units means identical.
fn similarity(total: usize, unchanged: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let ratio = unchanged as f64 / total as f64;
    (ratio * 1000.0).round() / 10.0
}
