//! In-process store backing all three storage traits.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use revhub_core::error::AppError;
use revhub_core::result::AppResult;
use revhub_core::types::{BranchId, ContentKey, PageRequest, PageResponse, VersionId};
use revhub_entity::{Branch, ContentItem, CreateBranch, CreateVersion, Version, VersionFilter};

use crate::traits::{BranchRepository, ContentRepository, PurgeRule, VersionRepository};

/// Versions, pointers, and branches held behind one lock.
///
/// Each trait method takes the lock once, so multi-row writes are atomic
/// with respect to every other caller. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    versions: HashMap<VersionId, Version>,
    items: HashMap<ContentKey, ContentItem>,
    branches: HashMap<BranchId, Branch>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryState {
    fn versions_of<'a>(&'a self, key: &'a ContentKey) -> impl Iterator<Item = &'a Version> + 'a {
        self.versions
            .values()
            .filter(move |v| v.content_type == key.content_type && v.content_id == key.content_id)
    }

    fn latest_number(&self, key: &ContentKey) -> i32 {
        self.versions_of(key)
            .map(|v| v.version_number)
            .max()
            .unwrap_or(0)
    }

    /// The pointer's number, or the newest number when there is no pointer.
    fn current_number(&self, key: &ContentKey) -> i32 {
        self.items
            .get(key)
            .map(|item| item.current_version_number)
            .unwrap_or_else(|| self.latest_number(key))
    }

    fn insert_version(&mut self, data: CreateVersion) -> AppResult<Version> {
        let taken = self
            .versions_of(&data.key)
            .any(|v| v.version_number == data.version_number);
        if taken {
            return Err(AppError::conflict(format!(
                "Version {} of {} was created concurrently",
                data.version_number, data.key
            )));
        }

        let make_current = data.make_current;
        let version = data.into_version(VersionId::new(), Utc::now());
        if make_current {
            self.set_pointer(&version.key(), version.version_number);
        }
        self.versions.insert(version.id, version.clone());
        Ok(version)
    }

    fn set_pointer(&mut self, key: &ContentKey, version_number: i32) -> ContentItem {
        let item = ContentItem {
            content_type: key.content_type.clone(),
            content_id: key.content_id.clone(),
            current_version_number: version_number,
            updated_at: Utc::now(),
        };
        self.items.insert(key.clone(), item.clone());
        item
    }

    fn clear_defaults(&mut self, key: &ContentKey) {
        for branch in self.branches.values_mut() {
            if branch.content_type == key.content_type && branch.content_id == key.content_id {
                branch.is_default = false;
            }
        }
    }

    fn branch_mut(&mut self, id: BranchId) -> AppResult<&mut Branch> {
        self.branches
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Branch {id} not found")))
    }
}

/// Sort newest first.
fn newest_first(mut versions: Vec<Version>) -> Vec<Version> {
    versions.sort_by(|a, b| b.version_number.cmp(&a.version_number));
    versions
}

#[async_trait]
impl VersionRepository for MemoryStore {
    async fn find_by_id(&self, id: VersionId) -> AppResult<Option<Version>> {
        Ok(self.state.read().await.versions.get(&id).cloned())
    }

    async fn find_by_number(&self, key: &ContentKey, number: i32) -> AppResult<Option<Version>> {
        let state = self.state.read().await;
        Ok(state
            .versions_of(key)
            .find(|v| v.version_number == number)
            .cloned())
    }

    async fn latest_number(&self, key: &ContentKey) -> AppResult<i32> {
        Ok(self.state.read().await.latest_number(key))
    }

    async fn latest_on_branch(&self, key: &ContentKey, branch: &str) -> AppResult<Option<Version>> {
        let state = self.state.read().await;
        Ok(state
            .versions_of(key)
            .filter(|v| v.branch_name.as_deref() == Some(branch))
            .max_by_key(|v| v.version_number)
            .cloned())
    }

    async fn insert(&self, data: CreateVersion) -> AppResult<Version> {
        self.state.write().await.insert_version(data)
    }

    async fn list(
        &self,
        key: &ContentKey,
        filter: &VersionFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Version>> {
        debug!(key = %key, ?filter, page = page.page, "Listing versions in memory");
        let state = self.state.read().await;
        let matching = newest_first(
            state
                .versions_of(key)
                .filter(|v| filter.matches(v))
                .cloned()
                .collect(),
        );
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn list_all(&self, key: &ContentKey) -> AppResult<Vec<Version>> {
        let state = self.state.read().await;
        Ok(newest_first(state.versions_of(key).cloned().collect()))
    }

    async fn count(&self, key: &ContentKey) -> AppResult<u64> {
        Ok(self.state.read().await.versions_of(key).count() as u64)
    }

    async fn delete(&self, id: VersionId) -> AppResult<bool> {
        let mut state = self.state.write().await;
        if state.branches.values().any(|b| b.base_version_id == id) {
            return Err(AppError::invalid_operation(format!(
                "Version {id} is the base of a branch"
            )));
        }
        Ok(state.versions.remove(&id).is_some())
    }

    async fn purge(&self, key: &ContentKey, rule: PurgeRule) -> AppResult<u64> {
        let mut state = self.state.write().await;

        let current = state.current_number(key);
        let latest = state.latest_number(key);
        let bases: HashSet<VersionId> = state.branches.values().map(|b| b.base_version_id).collect();

        let doomed: Vec<VersionId> = state
            .versions_of(key)
            .filter(|v| v.version_number != 1 && v.version_number != current)
            .filter(|v| !bases.contains(&v.id))
            .filter(|v| match rule {
                PurgeRule::CreatedBefore(cutoff) => v.created_at < cutoff,
                PurgeRule::KeepLatest(keep) => {
                    i64::from(v.version_number) <= i64::from(latest) - i64::from(keep)
                }
            })
            .map(|v| v.id)
            .collect();

        for id in &doomed {
            state.versions.remove(id);
        }
        Ok(doomed.len() as u64)
    }
}

#[async_trait]
impl BranchRepository for MemoryStore {
    async fn find_by_id(&self, id: BranchId) -> AppResult<Option<Branch>> {
        Ok(self.state.read().await.branches.get(&id).cloned())
    }

    async fn find_by_name(&self, key: &ContentKey, name: &str) -> AppResult<Option<Branch>> {
        let state = self.state.read().await;
        Ok(state
            .branches
            .values()
            .find(|b| b.key() == *key && b.name == name)
            .cloned())
    }

    async fn list(&self, key: &ContentKey, include_archived: bool) -> AppResult<Vec<Branch>> {
        let state = self.state.read().await;
        let mut branches: Vec<Branch> = state
            .branches
            .values()
            .filter(|b| b.key() == *key && (include_archived || b.is_active))
            .cloned()
            .collect();
        branches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        Ok(branches)
    }

    async fn insert(&self, data: CreateBranch) -> AppResult<Branch> {
        let mut state = self.state.write().await;

        let duplicate = state
            .branches
            .values()
            .any(|b| b.key() == data.key && b.name == data.name);
        if duplicate {
            return Err(AppError::validation(format!(
                "Branch '{}' already exists for {}",
                data.name, data.key
            )));
        }
        if !state.versions.contains_key(&data.base_version_id) {
            return Err(AppError::not_found(format!(
                "Version {} not found",
                data.base_version_id
            )));
        }

        if data.is_default {
            state.clear_defaults(&data.key);
        }
        let branch = data.into_branch(BranchId::new(), Utc::now());
        state.branches.insert(branch.id, branch.clone());
        Ok(branch)
    }

    async fn set_default(&self, id: BranchId) -> AppResult<Branch> {
        let mut state = self.state.write().await;
        let key = state.branch_mut(id)?.key();
        state.clear_defaults(&key);
        let branch = state.branch_mut(id)?;
        branch.is_default = true;
        Ok(branch.clone())
    }

    async fn set_active(&self, id: BranchId, active: bool) -> AppResult<Branch> {
        let mut state = self.state.write().await;
        let branch = state.branch_mut(id)?;
        branch.is_active = active;
        branch.is_default = branch.is_default && active;
        Ok(branch.clone())
    }

    async fn is_base(&self, version_id: VersionId) -> AppResult<bool> {
        let state = self.state.read().await;
        Ok(state.branches.values().any(|b| b.base_version_id == version_id))
    }

    async fn merge(&self, data: CreateVersion, archive: Option<BranchId>) -> AppResult<Version> {
        let mut state = self.state.write().await;

        // Resolve the branch first so a missing one leaves nothing behind.
        if let Some(branch_id) = archive {
            state.branch_mut(branch_id)?;
        }
        let version = state.insert_version(CreateVersion {
            make_current: true,
            ..data
        })?;
        if let Some(branch_id) = archive {
            let branch = state.branch_mut(branch_id)?;
            branch.is_active = false;
            branch.is_default = false;
        }
        Ok(version)
    }
}

#[async_trait]
impl ContentRepository for MemoryStore {
    async fn find(&self, key: &ContentKey) -> AppResult<Option<ContentItem>> {
        Ok(self.state.read().await.items.get(key).cloned())
    }

    async fn set_current(&self, key: &ContentKey, version_number: i32) -> AppResult<ContentItem> {
        Ok(self.state.write().await.set_pointer(key, version_number))
    }
}
