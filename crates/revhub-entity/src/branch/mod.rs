//! Branch domain entities.

pub mod model;

pub use model::{Branch, BranchSummary, CreateBranch};
