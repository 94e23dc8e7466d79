//! # revhub-entity
//!
//! Entity models for RevHub. Every struct here is either a table row
//! (deriving `sqlx::FromRow`) or an input/value object consumed by the
//! repositories and services.

pub mod branch;
pub mod content;
pub mod version;

pub use branch::{Branch, BranchSummary, CreateBranch};
pub use content::ContentItem;
pub use version::{CreateVersion, LineageFilter, Snapshot, Version, VersionFilter, VersionMeta};
