//! Storage backend selection.

use std::sync::Arc;

use tracing::info;

use revhub_core::config::{DatabaseConfig, StoreBackend};
use revhub_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryStore;
use crate::migration::run_migrations;
use crate::repositories::{PgBranchRepository, PgContentRepository, PgVersionRepository};
use crate::traits::{BranchRepository, ContentRepository, VersionRepository};

/// The repositories of one configured backend.
///
/// Built once at startup; services take the `Arc`s it hands out.
#[derive(Debug, Clone)]
pub struct StoreProvider {
    versions: Arc<dyn VersionRepository>,
    branches: Arc<dyn BranchRepository>,
    content: Arc<dyn ContentRepository>,
    pool: Option<DatabasePool>,
}

impl StoreProvider {
    /// Build the backend named by `config.backend`.
    ///
    /// The Postgres backend connects immediately and applies migrations
    /// when `run_migrations` is set.
    pub async fn new(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            StoreBackend::Postgres => {
                info!("Initializing PostgreSQL store");
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                Ok(Self::postgres(pool))
            }
            StoreBackend::Memory => {
                info!("Initializing in-memory store");
                Ok(Self::memory(MemoryStore::new()))
            }
        }
    }

    /// Repositories over an open Postgres pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        Self {
            versions: Arc::new(PgVersionRepository::new(pool.pool().clone())),
            branches: Arc::new(PgBranchRepository::new(pool.pool().clone())),
            content: Arc::new(PgContentRepository::new(pool.pool().clone())),
            pool: Some(pool),
        }
    }

    /// Repositories sharing one in-memory store.
    pub fn memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            versions: store.clone(),
            branches: store.clone(),
            content: store,
            pool: None,
        }
    }

    /// Version repository.
    pub fn versions(&self) -> Arc<dyn VersionRepository> {
        Arc::clone(&self.versions)
    }

    /// Branch repository.
    pub fn branches(&self) -> Arc<dyn BranchRepository> {
        Arc::clone(&self.branches)
    }

    /// Content pointer repository.
    pub fn content(&self) -> Arc<dyn ContentRepository> {
        Arc::clone(&self.content)
    }

    /// The Postgres pool, when that backend is active.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }
}
