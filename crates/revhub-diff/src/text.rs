//! Line-oriented text diff.
//!
//! Splits on `\n` and aligns lines with Myers' diff. A replaced block is
//! emitted as its deletions followed by its insertions.
//!
//! The search is bounded by [`LINE_DIFF_TIMEOUT`]. Past it, the remaining
//! unmatched region is reported as one replaced block, so the result is
//! always a valid edit script even when it is not a minimal one.

use std::time::{Duration, Instant};

use similar::{Algorithm, DiffTag, capture_diff_slices_deadline};

use crate::model::{LineKind, LineOp};

/// Time budget for aligning one pair of texts.
pub const LINE_DIFF_TIMEOUT: Duration = Duration::from_secs(2);

/// Split text into lines. An empty string is one empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n').collect()
}

/// Diff two texts line by line.
pub fn diff_lines(old: &str, new: &str) -> Vec<LineOp> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let mut result = Vec::with_capacity(old_lines.len().max(new_lines.len()));
    let mut deleted: Vec<LineOp> = Vec::new();
    let mut inserted: Vec<LineOp> = Vec::new();

    let deadline = Instant::now() + LINE_DIFF_TIMEOUT;
    let ops = capture_diff_slices_deadline(Algorithm::Myers, &old_lines, &new_lines, Some(deadline));

    for op in ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            flush(&mut result, &mut deleted, &mut inserted);
            for (o, n) in old_range.zip(new_range) {
                result.push(LineOp {
                    kind: LineKind::Equal,
                    old_line: Some(o + 1),
                    new_line: Some(n + 1),
                    content: old_lines[o].to_string(),
                });
            }
            continue;
        }

        deleted.extend(old_range.map(|o| LineOp {
            kind: LineKind::Delete,
            old_line: Some(o + 1),
            new_line: None,
            content: old_lines[o].to_string(),
        }));
        inserted.extend(new_range.map(|n| LineOp {
            kind: LineKind::Insert,
            old_line: None,
            new_line: Some(n + 1),
            content: new_lines[n].to_string(),
        }));
    }
    flush(&mut result, &mut deleted, &mut inserted);

    result
}

/// Emit a pending change block, deletions first.
fn flush(result: &mut Vec<LineOp>, deleted: &mut Vec<LineOp>, inserted: &mut Vec<LineOp>) {
    result.append(deleted);
    result.append(inserted);
}

/// Aligned line slots and how many of them are equal.
///
/// Returns `(units, unchanged)` where `units` is the longer side's line
/// count.
pub fn line_units(old: &str, new: &str, ops: &[LineOp]) -> (usize, usize) {
    let units = split_lines(old).len().max(split_lines(new).len());
    let unchanged = ops.iter().filter(|op| op.kind == LineKind::Equal).count();
    (units, unchanged)
}
