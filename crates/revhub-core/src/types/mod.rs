//! Core type definitions used across the RevHub workspace.

pub mod content_key;
pub mod id;
pub mod pagination;

pub use content_key::ContentKey;
pub use id::*;
pub use pagination::{PageRequest, PageResponse};
