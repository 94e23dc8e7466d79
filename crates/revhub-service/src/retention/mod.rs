//! Bounded version retention.

pub mod service;

pub use service::RetentionService;
