//! Storage traits implemented by the PostgreSQL and in-memory backends.
//!
//! Every method that writes more than one row is atomic: either all of
//! its effects are visible afterwards or none are.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use revhub_core::result::AppResult;
use revhub_core::types::{BranchId, ContentKey, PageRequest, PageResponse, VersionId};
use revhub_entity::{Branch, ContentItem, CreateBranch, CreateVersion, Version, VersionFilter};

/// Which versions a purge considers eligible.
///
/// The current version, version 1, and every branch base are never
/// eligible, whatever the rule says.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurgeRule {
    /// Versions created strictly before the cutoff.
    CreatedBefore(DateTime<Utc>),
    /// Everything except the newest `n` versions by number.
    KeepLatest(u32),
}

/// Versions of content items.
#[async_trait]
pub trait VersionRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a version by id.
    async fn find_by_id(&self, id: VersionId) -> AppResult<Option<Version>>;

    /// Find a version by its number within a content item.
    async fn find_by_number(&self, key: &ContentKey, number: i32) -> AppResult<Option<Version>>;

    /// Highest version number of a content item, 0 when it has none.
    async fn latest_number(&self, key: &ContentKey) -> AppResult<i32>;

    /// Newest version recorded on the named branch.
    async fn latest_on_branch(&self, key: &ContentKey, branch: &str) -> AppResult<Option<Version>>;

    /// Insert a version.
    ///
    /// Fails with `Conflict` when the number is already taken. When
    /// `make_current` is set the content pointer is upserted in the same
    /// transaction.
    async fn insert(&self, data: CreateVersion) -> AppResult<Version>;

    /// Filtered, paginated listing ordered by `version_number` descending.
    async fn list(
        &self,
        key: &ContentKey,
        filter: &VersionFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Version>>;

    /// Every version of a content item, newest first.
    async fn list_all(&self, key: &ContentKey) -> AppResult<Vec<Version>>;

    /// Number of versions of a content item.
    async fn count(&self, key: &ContentKey) -> AppResult<u64>;

    /// Delete one version. Returns `false` when it did not exist.
    async fn delete(&self, id: VersionId) -> AppResult<bool>;

    /// Delete the unprotected versions matching `rule` in one statement.
    /// Returns the number removed.
    async fn purge(&self, key: &ContentKey, rule: PurgeRule) -> AppResult<u64>;
}

/// Named branches of content items.
#[async_trait]
pub trait BranchRepository: Send + Sync + std::fmt::Debug + 'static {
    /// Find a branch by id.
    async fn find_by_id(&self, id: BranchId) -> AppResult<Option<Branch>>;

    /// Find a branch by name within a content item.
    async fn find_by_name(&self, key: &ContentKey, name: &str) -> AppResult<Option<Branch>>;

    /// Branches of a content item ordered by creation time.
    async fn list(&self, key: &ContentKey, include_archived: bool) -> AppResult<Vec<Branch>>;

    /// Insert a branch, clearing any other default of the same item when
    /// the new one is the default. A name already used by the item fails
    /// with `Validation`; losing a race for the default flag fails with
    /// `Conflict`.
    async fn insert(&self, data: CreateBranch) -> AppResult<Branch>;

    /// Make a branch the item's only default.
    async fn set_default(&self, id: BranchId) -> AppResult<Branch>;

    /// Archive or reactivate a branch. Archiving also clears the default flag.
    async fn set_active(&self, id: BranchId, active: bool) -> AppResult<Branch>;

    /// Whether any branch uses the version as its base.
    async fn is_base(&self, version_id: VersionId) -> AppResult<bool>;

    /// Write a merge result: insert the version, move the pointer, and
    /// archive `archive` when given, all in one transaction.
    async fn merge(&self, data: CreateVersion, archive: Option<BranchId>) -> AppResult<Version>;
}

/// Current-version pointers of content items.
#[async_trait]
pub trait ContentRepository: Send + Sync + std::fmt::Debug + 'static {
    /// The pointer row of a content item.
    async fn find(&self, key: &ContentKey) -> AppResult<Option<ContentItem>>;

    /// Point the item at `version_number`, creating the row if needed.
    async fn set_current(&self, key: &ContentKey, version_number: i32) -> AppResult<ContentItem>;
}
