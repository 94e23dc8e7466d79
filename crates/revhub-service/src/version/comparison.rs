//! Comparison of two versions of the same content item.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use revhub_core::error::AppError;
use revhub_core::result::AppResult;
use revhub_core::types::{ContentKey, VersionId};
use revhub_diff::{DiffEngine, DiffResult, DiffStats};
use revhub_entity::Version;

use super::service::VersionService;

/// The outcome of comparing an old version against a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionComparison {
    /// The content item both versions belong to.
    pub key: ContentKey,
    /// Id of the version treated as old.
    pub old_version_id: VersionId,
    /// Number of the version treated as old.
    pub old_version_number: i32,
    /// Id of the version treated as new.
    pub new_version_id: VersionId,
    /// Number of the version treated as new.
    pub new_version_number: i32,
    /// Field-level differences.
    pub diff: DiffResult,
    /// Aggregate counts.
    pub stats: DiffStats,
}

impl VersionComparison {
    /// Diff two already-loaded versions, `old` first.
    pub fn between(engine: &DiffEngine, old: &Version, new: &Version) -> AppResult<Self> {
        if !old.same_item(new) {
            return Err(AppError::validation(format!(
                "Cannot compare versions of different items: {} and {}",
                old.key(),
                new.key()
            )));
        }

        let diff = engine.compare(&old.data, &new.data)?;
        let stats = DiffEngine::diff_stats(&diff);
        Ok(Self {
            key: old.key(),
            old_version_id: old.id,
            old_version_number: old.version_number,
            new_version_id: new.id,
            new_version_number: new.version_number,
            diff,
            stats,
        })
    }
}

/// Compares versions through the diff engine.
#[derive(Debug, Clone)]
pub struct ComparisonService {
    /// Version lookups.
    versions: Arc<VersionService>,
    /// Diff engine.
    engine: Arc<DiffEngine>,
}

impl ComparisonService {
    /// Creates a new comparison service.
    pub fn new(versions: Arc<VersionService>, engine: Arc<DiffEngine>) -> Self {
        Self { versions, engine }
    }

    /// Compare version `old_id` against version `new_id`.
    ///
    /// The first argument is always the old side, whichever number is
    /// higher. Both must belong to the same content item.
    pub async fn compare_versions(
        &self,
        old_id: VersionId,
        new_id: VersionId,
    ) -> AppResult<VersionComparison> {
        let old = self.versions.get_version(old_id).await?;
        let new = self.versions.get_version(new_id).await?;

        let comparison = VersionComparison::between(&self.engine, &old, &new)?;
        debug!(
            key = %comparison.key,
            old = comparison.old_version_number,
            new = comparison.new_version_number,
            similarity = comparison.diff.similarity_percentage,
            "Versions compared"
        );
        Ok(comparison)
    }

    /// Compare a version against its item's current version.
    pub async fn compare_with_current(&self, id: VersionId) -> AppResult<VersionComparison> {
        let version = self.versions.get_version(id).await?;
        let current = self.versions.current_version(&version.key()).await?;
        VersionComparison::between(&self.engine, &version, &current)
    }
}
