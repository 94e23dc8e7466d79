//! Version history: storage, comparison, restore, and timeline.

pub mod comparison;
pub mod restore;
pub mod service;
pub mod timeline;

pub use comparison::{ComparisonService, VersionComparison};
pub use restore::RestoreService;
pub use service::VersionService;
pub use timeline::{TimelineEntry, VersionTimeline};
