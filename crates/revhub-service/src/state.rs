//! Wiring of every service over one storage backend.

use std::sync::Arc;

use revhub_core::config::AppConfig;
use revhub_core::result::AppResult;
use revhub_database::StoreProvider;
use revhub_diff::DiffEngine;

use crate::branch::BranchManager;
use crate::retention::RetentionService;
use crate::version::{ComparisonService, RestoreService, VersionService, VersionTimeline};

/// All RevHub services, built once at the application boundary.
///
/// Cloning is cheap; every field is shared.
#[derive(Debug, Clone)]
pub struct AppServices {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Storage backend
    pub store: StoreProvider,
    /// Diff engine shared by comparison, timeline, and branches
    pub engine: Arc<DiffEngine>,

    // ── Services ─────────────────────────────────────────────
    pub versions: Arc<VersionService>,
    pub comparison: Arc<ComparisonService>,
    pub restore: Arc<RestoreService>,
    pub timeline: Arc<VersionTimeline>,
    pub branches: Arc<BranchManager>,
    pub retention: Arc<RetentionService>,
}

impl AppServices {
    /// Build the configured backend and the services over it.
    pub async fn connect(config: AppConfig) -> AppResult<Self> {
        let store = StoreProvider::new(&config.database).await?;
        Ok(Self::new(config, store))
    }

    /// Build the services over an existing backend.
    pub fn new(config: AppConfig, store: StoreProvider) -> Self {
        let engine = Arc::new(DiffEngine::new(config.diff.clone()));

        let versions = Arc::new(VersionService::new(
            store.versions(),
            store.branches(),
            store.content(),
        ));
        let comparison = Arc::new(ComparisonService::new(versions.clone(), engine.clone()));
        let restore = Arc::new(RestoreService::new(store.versions()));
        let timeline = Arc::new(VersionTimeline::new(versions.clone(), engine.clone()));
        let branches = Arc::new(BranchManager::new(
            store.versions(),
            store.branches(),
            versions.clone(),
            engine.clone(),
        ));
        let retention = Arc::new(RetentionService::new(
            store.versions(),
            config.retention.clone(),
        ));

        Self {
            config: Arc::new(config),
            store,
            engine,
            versions,
            comparison,
            restore,
            timeline,
            branches,
            retention,
        }
    }
}
