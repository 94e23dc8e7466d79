//! In-memory storage backend for tests and local runs.

pub mod store;

pub use store::MemoryStore;
