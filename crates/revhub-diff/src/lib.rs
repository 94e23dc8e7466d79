//! # revhub-diff
//!
//! Pure comparison of two data snapshots. Walks the union of fields,
//! recurses into nested mappings, runs a Myers line diff over designated
//! long-text fields, and scores similarity. Nothing in this crate touches
//! storage or randomness. Equal inputs yield equal outputs as long as each
//! line diff finishes inside its time bound.

pub mod conflict;
pub mod engine;
pub mod model;
pub mod render;
pub mod stats;
pub mod text;

pub use conflict::{FieldConflict, detect_conflicts};
pub use engine::DiffEngine;
pub use model::{DiffResult, DiffStatus, FieldDiff, LineKind, LineOp};
pub use render::render;
pub use stats::DiffStats;
