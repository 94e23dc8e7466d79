//! # revhub-database
//!
//! Persistence for RevHub. The storage traits in [`traits`] are what the
//! service layer depends on; [`repositories`] implements them over
//! PostgreSQL and [`memory`] implements them in process. The
//! [`StoreProvider`] picks one of the two from configuration.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod provider;
pub mod repositories;
pub mod traits;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use provider::StoreProvider;
pub use traits::{BranchRepository, ContentRepository, PurgeRule, VersionRepository};
