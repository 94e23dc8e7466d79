//! Version domain entities.

pub mod filter;
pub mod model;

pub use filter::{LineageFilter, VersionFilter};
pub use model::{CreateVersion, Snapshot, Version, VersionMeta};
