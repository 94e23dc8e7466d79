//! Content item pointer.

pub mod model;

pub use model::ContentItem;
