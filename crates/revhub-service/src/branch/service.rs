//! Branch lifecycle: create, list, default selection, archive.

use std::sync::Arc;

use tracing::info;

use revhub_core::error::AppError;
use revhub_core::result::AppResult;
use revhub_core::types::{BranchId, ContentKey, VersionId};
use revhub_database::{BranchRepository, VersionRepository};
use revhub_diff::DiffEngine;
use revhub_entity::{Branch, BranchSummary, CreateBranch};

use crate::context::RequestContext;
use crate::version::VersionService;

/// Manages named branches of content items.
#[derive(Debug, Clone)]
pub struct BranchManager {
    pub(super) versions: Arc<dyn VersionRepository>,
    pub(super) branches: Arc<dyn BranchRepository>,
    /// Resolves the item's current version.
    pub(super) history: Arc<VersionService>,
    pub(super) engine: Arc<DiffEngine>,
}

impl BranchManager {
    /// Creates a new branch manager.
    pub fn new(
        versions: Arc<dyn VersionRepository>,
        branches: Arc<dyn BranchRepository>,
        history: Arc<VersionService>,
        engine: Arc<DiffEngine>,
    ) -> Self {
        Self {
            versions,
            branches,
            history,
            engine,
        }
    }

    /// Create a branch of `key` forked at `base_version_id`.
    pub async fn create_branch(
        &self,
        ctx: &RequestContext,
        key: &ContentKey,
        name: &str,
        base_version_id: VersionId,
        is_default: bool,
    ) -> AppResult<Branch> {
        let name = CreateBranch::validate_name(name)?;

        if self.branches.find_by_name(key, &name).await?.is_some() {
            return Err(duplicate_name(&name, key));
        }

        let base = self
            .versions
            .find_by_id(base_version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Version {base_version_id} not found")))?;
        if base.key() != *key {
            return Err(AppError::validation(format!(
                "Version {base_version_id} belongs to {}, not {key}",
                base.key()
            )));
        }

        let branch = self
            .branches
            .insert(CreateBranch {
                key: key.clone(),
                name: name.clone(),
                base_version_id,
                is_default,
                created_by: ctx.user_id,
            })
            .await?;

        info!(
            content_type = %key.content_type,
            content_id = %key.content_id,
            branch = %branch.name,
            base_version = base.version_number,
            is_default,
            "Branch created"
        );
        Ok(branch)
    }

    /// Active branches of `key`, each with its base and newest version.
    pub async fn list_branches(&self, key: &ContentKey) -> AppResult<Vec<BranchSummary>> {
        self.summaries(key, false).await
    }

    /// All branches of `key`, archived ones included.
    pub async fn list_all_branches(&self, key: &ContentKey) -> AppResult<Vec<BranchSummary>> {
        self.summaries(key, true).await
    }

    /// Fetch a branch by id.
    pub async fn get_branch(&self, id: BranchId) -> AppResult<Branch> {
        self.branches
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Branch {id} not found")))
    }

    /// Make a branch the item's default.
    pub async fn set_default(&self, id: BranchId) -> AppResult<Branch> {
        let branch = self.get_branch(id).await?;
        if !branch.is_active {
            return Err(AppError::invalid_operation(format!(
                "Branch '{}' is archived",
                branch.name
            )));
        }
        let branch = self.branches.set_default(id).await?;
        info!(branch = %branch.name, key = %branch.key(), "Default branch changed");
        Ok(branch)
    }

    /// Hide a branch from the active listing. Its versions stay.
    pub async fn archive_branch(&self, id: BranchId) -> AppResult<Branch> {
        let branch = self.branches.set_active(id, false).await?;
        info!(branch = %branch.name, key = %branch.key(), "Branch archived");
        Ok(branch)
    }

    /// Return an archived branch to the active listing.
    pub async fn reactivate_branch(&self, id: BranchId) -> AppResult<Branch> {
        let branch = self.branches.set_active(id, true).await?;
        info!(branch = %branch.name, key = %branch.key(), "Branch reactivated");
        Ok(branch)
    }

    /// Resolve a branch's base and newest version.
    pub(super) async fn summarize(&self, branch: Branch) -> AppResult<BranchSummary> {
        let base_version = self
            .versions
            .find_by_id(branch.base_version_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Base version {} of branch '{}' not found",
                    branch.base_version_id, branch.name
                ))
            })?;
        let latest_version = self
            .versions
            .latest_on_branch(&branch.key(), &branch.name)
            .await?;
        Ok(BranchSummary {
            branch,
            base_version,
            latest_version,
        })
    }

    async fn summaries(&self, key: &ContentKey, include_archived: bool) -> AppResult<Vec<BranchSummary>> {
        let branches = self.branches.list(key, include_archived).await?;
        let mut summaries = Vec::with_capacity(branches.len());
        for branch in branches {
            summaries.push(self.summarize(branch).await?);
        }
        Ok(summaries)
    }
}

fn duplicate_name(name: &str, key: &ContentKey) -> AppError {
    AppError::validation(format!("Branch '{name}' already exists for {key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use revhub_core::ErrorKind;
    use revhub_core::types::UserId;
    use revhub_database::StoreProvider;
    use revhub_database::memory::MemoryStore;
    use revhub_database::BranchRepository;
    use revhub_entity::{CreateVersion, Snapshot, Version, VersionMeta};

    /// Branch store whose inserts always lose a unique-index race.
    #[derive(Debug)]
    struct RacingInserts(Arc<dyn BranchRepository>);

    #[async_trait]
    impl BranchRepository for RacingInserts {
        async fn find_by_id(&self, id: BranchId) -> AppResult<Option<Branch>> {
            self.0.find_by_id(id).await
        }

        async fn find_by_name(&self, key: &ContentKey, name: &str) -> AppResult<Option<Branch>> {
            self.0.find_by_name(key, name).await
        }

        async fn list(&self, key: &ContentKey, include_archived: bool) -> AppResult<Vec<Branch>> {
            self.0.list(key, include_archived).await
        }

        async fn insert(&self, data: CreateBranch) -> AppResult<Branch> {
            Err(AppError::conflict(format!(
                "Another default branch of {} was set concurrently",
                data.key
            )))
        }

        async fn set_default(&self, id: BranchId) -> AppResult<Branch> {
            self.0.set_default(id).await
        }

        async fn set_active(&self, id: BranchId, active: bool) -> AppResult<Branch> {
            self.0.set_active(id, active).await
        }

        async fn is_base(&self, version_id: VersionId) -> AppResult<bool> {
            self.0.is_base(version_id).await
        }

        async fn merge(&self, data: CreateVersion, archive: Option<BranchId>) -> AppResult<Version> {
            self.0.merge(data, archive).await
        }
    }

    fn key() -> ContentKey {
        ContentKey::new("article", "42").expect("key")
    }

    async fn setup() -> (BranchManager, StoreProvider, Version) {
        let store = StoreProvider::memory(MemoryStore::new());
        let history = Arc::new(VersionService::new(
            store.versions(),
            store.branches(),
            store.content(),
        ));
        let manager = BranchManager::new(
            store.versions(),
            store.branches(),
            history,
            Arc::new(DiffEngine::default()),
        );
        let base = store
            .versions()
            .insert(CreateVersion::new(key(), 1, Snapshot::new(), VersionMeta::current_by(None)))
            .await
            .expect("base");
        (manager, store, base)
    }

    #[tokio::test]
    async fn test_create_branch_records_creator() {
        let (manager, _, base) = setup().await;
        let user = UserId::new();
        let branch = manager
            .create_branch(&RequestContext::new(user), &key(), "  redesign ", base.id, false)
            .await
            .expect("create");
        assert_eq!(branch.name, "redesign");
        assert_eq!(branch.created_by, Some(user));
        assert!(branch.is_active);
    }

    #[tokio::test]
    async fn test_invalid_names_and_duplicates() {
        let (manager, _, base) = setup().await;
        let ctx = RequestContext::system();
        for bad in ["", "   ", "main"] {
            let err = manager
                .create_branch(&ctx, &key(), bad, base.id, false)
                .await
                .expect_err("invalid name");
            assert_eq!(err.kind, ErrorKind::Validation);
        }

        manager
            .create_branch(&ctx, &key(), "spring", base.id, false)
            .await
            .expect("create");
        let err = manager
            .create_branch(&ctx, &key(), "spring", base.id, false)
            .await
            .expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_base_must_exist_and_match_item() {
        let (manager, store, _) = setup().await;
        let ctx = RequestContext::system();
        let err = manager
            .create_branch(&ctx, &key(), "x", VersionId::new(), false)
            .await
            .expect_err("missing base");
        assert_eq!(err.kind, ErrorKind::NotFound);

        let other = ContentKey::new("article", "43").expect("key");
        let foreign = store
            .versions()
            .insert(CreateVersion::new(other, 1, Snapshot::new(), VersionMeta::default()))
            .await
            .expect("foreign");
        let err = manager
            .create_branch(&ctx, &key(), "x", foreign.id, false)
            .await
            .expect_err("foreign base");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_single_default_and_archive() {
        let (manager, _, base) = setup().await;
        let ctx = RequestContext::system();
        let a = manager
            .create_branch(&ctx, &key(), "a", base.id, true)
            .await
            .expect("a");
        let b = manager
            .create_branch(&ctx, &key(), "b", base.id, false)
            .await
            .expect("b");

        manager.set_default(b.id).await.expect("default");
        let summaries = manager.list_branches(&key()).await.expect("list");
        let defaults: Vec<&str> = summaries
            .iter()
            .filter(|s| s.branch.is_default)
            .map(|s| s.branch.name.as_str())
            .collect();
        assert_eq!(defaults, vec!["b"]);

        let archived = manager.archive_branch(b.id).await.expect("archive");
        assert!(!archived.is_active);
        assert!(!archived.is_default);
        let err = manager.set_default(b.id).await.expect_err("archived");
        assert_eq!(err.kind, ErrorKind::InvalidOperation);

        let active = manager.list_branches(&key()).await.expect("list");
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].branch.id, a.id);
        assert_eq!(manager.list_all_branches(&key()).await.expect("all").len(), 2);

        manager.reactivate_branch(b.id).await.expect("reactivate");
        assert_eq!(manager.list_branches(&key()).await.expect("list").len(), 2);
    }

    #[tokio::test]
    async fn test_summary_tracks_latest_branch_version() {
        let (manager, store, base) = setup().await;
        manager
            .create_branch(&RequestContext::system(), &key(), "draft", base.id, false)
            .await
            .expect("create");

        let summary = &manager.list_branches(&key()).await.expect("list")[0];
        assert_eq!(summary.base_version.id, base.id);
        assert!(summary.latest_version.is_none());
        assert_eq!(summary.head().id, base.id);

        let on_branch = store
            .versions()
            .insert(CreateVersion::new(
                key(),
                2,
                Snapshot::new(),
                VersionMeta::default().on_branch("draft"),
            ))
            .await
            .expect("branch version");
        let summary = &manager.list_branches(&key()).await.expect("list")[0];
        assert_eq!(summary.head().id, on_branch.id);
    }

    #[tokio::test]
    async fn test_default_race_is_not_reported_as_duplicate_name() {
        let store = StoreProvider::memory(MemoryStore::new());
        let branches: Arc<dyn BranchRepository> = Arc::new(RacingInserts(store.branches()));
        let history = Arc::new(VersionService::new(
            store.versions(),
            branches.clone(),
            store.content(),
        ));
        let manager = BranchManager::new(
            store.versions(),
            branches,
            history,
            Arc::new(DiffEngine::default()),
        );
        let base = store
            .versions()
            .insert(CreateVersion::new(key(), 1, Snapshot::new(), VersionMeta::current_by(None)))
            .await
            .expect("base");

        let err = manager
            .create_branch(&RequestContext::system(), &key(), "draft", base.id, true)
            .await
            .expect_err("lost race");
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.message.contains("default branch"));
    }
}
