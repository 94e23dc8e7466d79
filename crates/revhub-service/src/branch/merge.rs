//! Comparing a branch with the main line and merging it back.

use serde::{Deserialize, Serialize};
use tracing::info;

use revhub_core::error::AppError;
use revhub_core::result::AppResult;
use revhub_core::types::BranchId;
use revhub_diff::{FieldConflict, detect_conflicts};
use revhub_entity::{Branch, CreateVersion, Version, VersionMeta};

use super::service::BranchManager;
use crate::context::RequestContext;
use crate::version::VersionComparison;

/// A branch head compared against the item's current version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchComparison {
    pub branch: Branch,
    /// Current version number on the main side.
    pub main_version_number: i32,
    /// Number of the branch head.
    pub head_version_number: i32,
    /// Current version (old) against the branch head (new).
    pub comparison: VersionComparison,
    /// Fields both sides changed differently since the branch base.
    pub conflicts: Vec<FieldConflict>,
}

impl BranchComparison {
    /// Whether merging would overwrite main-side edits.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }
}

impl BranchManager {
    /// Compare a branch's head with the item's current version.
    pub async fn compare_branch(&self, id: BranchId) -> AppResult<BranchComparison> {
        let branch = self.get_branch(id).await?;
        let summary = self.summarize(branch).await?;
        let current = self.history.current_version(&summary.branch.key()).await?;
        let head = summary.head();

        let comparison = VersionComparison::between(&self.engine, &current, head)?;
        let conflicts = detect_conflicts(&summary.base_version.data, &current.data, &head.data);

        Ok(BranchComparison {
            main_version_number: current.version_number,
            head_version_number: head.version_number,
            comparison,
            conflicts,
            branch: summary.branch.clone(),
        })
    }

    /// Merge a branch into the main line.
    ///
    /// Appends a main-lineage version holding the branch head's data, makes
    /// it current, and archives the branch when `archive` is set, in one
    /// transaction. The branch head wins on conflicting fields.
    pub async fn merge_branch(
        &self,
        ctx: &RequestContext,
        id: BranchId,
        archive: bool,
    ) -> AppResult<Version> {
        let branch = self.get_branch(id).await?;
        if !branch.is_active {
            return Err(AppError::invalid_operation(format!(
                "Branch '{}' is archived",
                branch.name
            )));
        }

        let summary = self.summarize(branch).await?;
        let key = summary.branch.key();
        let head = summary.head();
        let number = self.versions.latest_number(&key).await? + 1;

        let meta = VersionMeta {
            author_id: ctx.user_id,
            comment: Some(format!("Merged branch '{}'", summary.branch.name)),
            make_current: true,
            ..VersionMeta::default()
        };
        let merged = self
            .branches
            .merge(
                CreateVersion::new(key, number, head.data.clone(), meta),
                archive.then_some(id),
            )
            .await?;

        info!(
            content_type = %merged.content_type,
            content_id = %merged.content_id,
            version_number = merged.version_number,
            branch = %summary.branch.name,
            head = head.version_number,
            archived = archive,
            "Branch merged"
        );
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::version::VersionService;
    use revhub_core::ErrorKind;
    use revhub_core::types::ContentKey;
    use revhub_database::memory::MemoryStore;
    use revhub_database::StoreProvider;
    use revhub_diff::DiffEngine;
    use revhub_entity::Snapshot;
    use serde_json::{Value, json};

    fn key() -> ContentKey {
        ContentKey::new("article", "42").expect("key")
    }

    fn snapshot(value: Value) -> Snapshot {
        match value {
            Value::Object(map) => map,
            _ => panic!("snapshot must be an object"),
        }
    }

    fn manager_over(store: &StoreProvider) -> BranchManager {
        let history = Arc::new(VersionService::new(
            store.versions(),
            store.branches(),
            store.content(),
        ));
        BranchManager::new(
            store.versions(),
            store.branches(),
            history,
            Arc::new(DiffEngine::default()),
        )
    }

    struct Fixture {
        manager: BranchManager,
        store: StoreProvider,
        branch: Branch,
    }

    /// v1 base, branch "draft" from v1, v2 on main (current), v3 on draft.
    async fn fixture() -> Fixture {
        let store = StoreProvider::memory(MemoryStore::new());
        let manager = manager_over(&store);
        let versions = store.versions();
        let v1 = versions
            .insert(CreateVersion::new(
                key(),
                1,
                snapshot(json!({"title": "A", "slug": "a", "lede": "l"})),
                VersionMeta::current_by(None),
            ))
            .await
            .expect("v1");
        let branch = manager
            .create_branch(&RequestContext::system(), &key(), "draft", v1.id, false)
            .await
            .expect("branch");
        versions
            .insert(CreateVersion::new(
                key(),
                2,
                snapshot(json!({"title": "Main title", "slug": "a", "lede": "l"})),
                VersionMeta::current_by(None),
            ))
            .await
            .expect("v2");
        versions
            .insert(CreateVersion::new(
                key(),
                3,
                snapshot(json!({"title": "Draft title", "slug": "a", "lede": "new"})),
                VersionMeta::default().on_branch("draft"),
            ))
            .await
            .expect("v3");
        Fixture {
            manager,
            store,
            branch,
        }
    }

    #[tokio::test]
    async fn test_compare_branch_reports_conflicts() {
        let f = fixture().await;
        let result = f.manager.compare_branch(f.branch.id).await.expect("compare");

        assert_eq!(result.main_version_number, 2);
        assert_eq!(result.head_version_number, 3);
        assert_eq!(result.comparison.stats.changes, 2);
        assert!(result.has_conflicts());
        let fields: Vec<&str> = result.conflicts.iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["title"]);
    }

    #[tokio::test]
    async fn test_merge_appends_main_version_and_archives() {
        let f = fixture().await;
        let user = revhub_core::types::UserId::new();
        let merged = f
            .manager
            .merge_branch(&RequestContext::new(user), f.branch.id, true)
            .await
            .expect("merge");

        assert_eq!(merged.version_number, 4);
        assert!(merged.is_main_lineage());
        assert_eq!(merged.author_id, Some(user));
        assert_eq!(merged.comment.as_deref(), Some("Merged branch 'draft'"));
        assert_eq!(merged.data["title"], json!("Draft title"));

        let item = f.store.content().find(&key()).await.expect("find").expect("pointer");
        assert_eq!(item.current_version_number, 4);

        let branch = f.manager.get_branch(f.branch.id).await.expect("branch");
        assert!(!branch.is_active);

        let err = f
            .manager
            .merge_branch(&RequestContext::system(), f.branch.id, false)
            .await
            .expect_err("archived");
        assert_eq!(err.kind, ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_merge_without_archive_keeps_branch_active() {
        let f = fixture().await;
        f.manager
            .merge_branch(&RequestContext::system(), f.branch.id, false)
            .await
            .expect("merge");
        assert!(f.manager.get_branch(f.branch.id).await.expect("branch").is_active);
        assert_eq!(f.store.versions().count(&key()).await.expect("count"), 4);
    }

    #[tokio::test]
    async fn test_compare_without_pointer_uses_newest_version() {
        let store = StoreProvider::memory(MemoryStore::new());
        let manager = manager_over(&store);
        let versions = store.versions();
        let v1 = versions
            .insert(CreateVersion::new(
                key(),
                1,
                snapshot(json!({"title": "A"})),
                VersionMeta::default(),
            ))
            .await
            .expect("v1");
        let branch = manager
            .create_branch(&RequestContext::system(), &key(), "draft", v1.id, false)
            .await
            .expect("branch");
        versions
            .insert(CreateVersion::new(
                key(),
                2,
                snapshot(json!({"title": "B"})),
                VersionMeta::default(),
            ))
            .await
            .expect("v2");
        assert!(store.content().find(&key()).await.expect("find").is_none());

        let result = manager.compare_branch(branch.id).await.expect("compare");
        let current = manager.history.current_number(&key()).await.expect("current");
        assert_eq!(Some(result.main_version_number), current);
        assert_eq!(result.main_version_number, 2);
        assert_eq!(result.head_version_number, 1);
    }
}
