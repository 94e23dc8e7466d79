//! Named branches of content items.

pub mod merge;
pub mod service;

pub use merge::BranchComparison;
pub use service::BranchManager;
