//! Forward-appending restore.

use std::sync::Arc;

use tracing::info;

use revhub_core::error::AppError;
use revhub_core::result::AppResult;
use revhub_core::types::VersionId;
use revhub_database::VersionRepository;
use revhub_entity::{CreateVersion, Version, VersionMeta};

use crate::context::RequestContext;

/// Restores old content by appending a copy of it as a new version.
///
/// History is never rewritten: the restored version gets the next number
/// and becomes current, and the target stays where it was. An item exists
/// as long as it has versions; a missing pointer row is created by the
/// restore itself.
#[derive(Debug, Clone)]
pub struct RestoreService {
    versions: Arc<dyn VersionRepository>,
}

impl RestoreService {
    /// Creates a new restore service.
    pub fn new(versions: Arc<dyn VersionRepository>) -> Self {
        Self { versions }
    }

    /// Restore version `id` of its content item.
    ///
    /// The new version copies the target's data and lineage, is authored by
    /// the acting user, and becomes current in the same transaction.
    pub async fn restore_version(&self, ctx: &RequestContext, id: VersionId) -> AppResult<Version> {
        let target = self
            .versions
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {id} not found")))?;
        let key = target.key();
        let number = self.versions.latest_number(&key).await? + 1;
        let meta = VersionMeta {
            author_id: ctx.user_id,
            comment: Some(format!("Restored from version {}", target.version_number)),
            tags: Vec::new(),
            branch_name: target.branch_name.clone(),
            make_current: true,
            restored_from: Some(target.version_number),
        };

        let restored = self
            .versions
            .insert(CreateVersion::new(key, number, target.data.clone(), meta))
            .await?;

        info!(
            content_type = %restored.content_type,
            content_id = %restored.content_id,
            version_number = restored.version_number,
            restored_from = target.version_number,
            "Version restored"
        );

        Ok(restored)
    }
}
