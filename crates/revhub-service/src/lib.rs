//! # revhub-service
//!
//! Application services over the storage traits. Each service receives
//! its repositories and collaborators at construction time as `Arc`s;
//! nothing here holds global state.

pub mod branch;
pub mod context;
pub mod retention;
pub mod state;
pub mod version;

pub use branch::{BranchComparison, BranchManager};
pub use context::RequestContext;
pub use retention::RetentionService;
pub use state::AppServices;
pub use version::{
    ComparisonService, RestoreService, TimelineEntry, VersionComparison, VersionService,
    VersionTimeline,
};
