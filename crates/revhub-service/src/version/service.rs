//! Version store service: create, read, list, and delete versions.

use std::sync::Arc;

use tracing::{debug, info};

use revhub_core::error::AppError;
use revhub_core::result::AppResult;
use revhub_core::types::{ContentKey, PageRequest, PageResponse, VersionId};
use revhub_database::{BranchRepository, ContentRepository, VersionRepository};
use revhub_entity::version::model::normalize_branch_name;
use revhub_entity::{CreateVersion, Snapshot, Version, VersionFilter, VersionMeta};

/// Owns the append-only version history of content items.
#[derive(Debug, Clone)]
pub struct VersionService {
    /// Version rows.
    versions: Arc<dyn VersionRepository>,
    /// Branch rows, for branch-name checks and base protection.
    branches: Arc<dyn BranchRepository>,
    /// Current-version pointers.
    content: Arc<dyn ContentRepository>,
}

impl VersionService {
    /// Creates a new version service.
    pub fn new(
        versions: Arc<dyn VersionRepository>,
        branches: Arc<dyn BranchRepository>,
        content: Arc<dyn ContentRepository>,
    ) -> Self {
        Self {
            versions,
            branches,
            content,
        }
    }

    /// Append a version with the next number.
    ///
    /// The number is one past the highest on record. Losing a race for it
    /// fails with `Conflict` and the caller may retry.
    pub async fn create_version(
        &self,
        key: &ContentKey,
        data: Snapshot,
        meta: VersionMeta,
    ) -> AppResult<Version> {
        if let Some(branch) = normalize_branch_name(meta.branch_name.clone()) {
            self.branches
                .find_by_name(key, &branch)
                .await?
                .ok_or_else(|| {
                    AppError::validation(format!("Branch '{branch}' does not exist for {key}"))
                })?;
        }

        let number = self.versions.latest_number(key).await? + 1;
        let version = self
            .versions
            .insert(CreateVersion::new(key.clone(), number, data, meta))
            .await?;

        info!(
            content_type = %version.content_type,
            content_id = %version.content_id,
            version_number = version.version_number,
            branch = version.branch_name.as_deref().unwrap_or("main"),
            "Version created"
        );

        Ok(version)
    }

    /// Fetch a version by id.
    pub async fn get_version(&self, id: VersionId) -> AppResult<Version> {
        debug!(version_id = %id, "Loading version");
        self.versions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {id} not found")))
    }

    /// Fetch a version by its number within a content item.
    pub async fn get_version_by_number(&self, key: &ContentKey, number: i32) -> AppResult<Version> {
        self.versions
            .find_by_number(key, number)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {number} of {key} not found")))
    }

    /// Number of the item's current version: the pointer when one exists,
    /// otherwise the newest version on record.
    pub async fn current_number(&self, key: &ContentKey) -> AppResult<Option<i32>> {
        if let Some(item) = self.content.find(key).await? {
            return Ok(Some(item.current_version_number));
        }
        let latest = self.versions.latest_number(key).await?;
        Ok((latest > 0).then_some(latest))
    }

    /// The item's current version.
    pub async fn current_version(&self, key: &ContentKey) -> AppResult<Version> {
        let number = self
            .current_number(key)
            .await?
            .ok_or_else(|| AppError::not_found(format!("{key} has no versions")))?;
        self.get_version_by_number(key, number).await
    }

    /// List versions newest first, filtered and paginated.
    pub async fn list_versions(
        &self,
        key: &ContentKey,
        filter: &VersionFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Version>> {
        self.versions.list(key, filter, page).await
    }

    /// Every version of the item, newest first.
    pub async fn list_all(&self, key: &ContentKey) -> AppResult<Vec<Version>> {
        self.versions.list_all(key).await
    }

    /// Delete a single version.
    ///
    /// The current version, the sole remaining version, and branch bases
    /// cannot be deleted.
    pub async fn delete_version(&self, id: VersionId) -> AppResult<()> {
        let version = self.get_version(id).await?;
        let key = version.key();

        if self.versions.count(&key).await? <= 1 {
            return Err(AppError::invalid_operation(format!(
                "Version {} is the only version of {key}",
                version.version_number
            )));
        }
        if self.current_number(&key).await? == Some(version.version_number) {
            return Err(AppError::invalid_operation(format!(
                "Version {} is the current version of {key}",
                version.version_number
            )));
        }
        if self.branches.is_base(id).await? {
            return Err(AppError::invalid_operation(format!(
                "Version {} is the base of a branch of {key}",
                version.version_number
            )));
        }

        if !self.versions.delete(id).await? {
            return Err(AppError::not_found(format!("Version {id} not found")));
        }

        info!(
            content_type = %key.content_type,
            content_id = %key.content_id,
            version_number = version.version_number,
            "Version deleted"
        );
        Ok(())
    }
}
