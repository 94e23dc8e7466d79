//! # revhub-core
//!
//! Core crate for RevHub. Contains configuration schemas, typed
//! identifiers, the content key, pagination types, and the unified error
//! system shared by every other crate.
//!
//! This crate has **no** internal dependencies on other RevHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
