//! PostgreSQL implementations of the storage traits.

pub mod branch;
pub mod content;
pub mod version;

pub use branch::PgBranchRepository;
pub use content::PgContentRepository;
pub use version::PgVersionRepository;
