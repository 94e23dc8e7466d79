//! Version entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use revhub_core::types::{ContentKey, UserId, VersionId};

/// Name reserved for the unnamed main lineage.
pub const MAIN_LINEAGE: &str = "main";

/// A structured data snapshot: field name to JSON value.
///
/// Keys iterate in sorted order, which keeps diffs deterministic.
pub type Snapshot = serde_json::Map<String, serde_json::Value>;

/// One immutable snapshot of a content item.
///
/// Rows are only ever inserted or deleted; nothing in RevHub updates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Version {
    /// Unique version identifier.
    pub id: VersionId,
    /// Schema tag of the owning entity.
    pub content_type: String,
    /// Identifier of the owning entity.
    pub content_id: String,
    /// Sequential number within the content item, starting at 1.
    pub version_number: i32,
    /// The full data snapshot.
    #[sqlx(json)]
    pub data: Snapshot,
    /// When the version was created.
    pub created_at: DateTime<Utc>,
    /// The author, `None` for system-generated versions.
    pub author_id: Option<UserId>,
    /// Optional description of the change.
    pub comment: Option<String>,
    /// Short labels, sorted and de-duplicated.
    pub tags: Vec<String>,
    /// Lineage tag; `None` means the main lineage.
    pub branch_name: Option<String>,
    /// Version number this one was restored from, if it is a restore.
    pub restored_from: Option<i32>,
}

impl Version {
    /// The content item this version belongs to.
    pub fn key(&self) -> ContentKey {
        ContentKey {
            content_type: self.content_type.clone(),
            content_id: self.content_id.clone(),
        }
    }

    /// Whether `other` belongs to the same content item.
    pub fn same_item(&self, other: &Version) -> bool {
        self.content_type == other.content_type && self.content_id == other.content_id
    }

    /// Whether this version sits on the main lineage.
    pub fn is_main_lineage(&self) -> bool {
        self.branch_name.is_none()
    }

    /// Whether the version carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Caller-supplied metadata for a new version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionMeta {
    /// The user producing the version.
    pub author_id: Option<UserId>,
    /// Free-text description of the change.
    pub comment: Option<String>,
    /// Labels; normalized on write.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Branch to record the version on; `None`, empty, or `"main"` is main.
    pub branch_name: Option<String>,
    /// Move the content item's current pointer to the new version.
    #[serde(default)]
    pub make_current: bool,
    /// Set by the restore flow to the version number being restored.
    #[serde(default)]
    pub restored_from: Option<i32>,
}

impl VersionMeta {
    /// Metadata for a version authored by `author_id` that becomes current.
    pub fn current_by(author_id: Option<UserId>) -> Self {
        Self {
            author_id,
            make_current: true,
            ..Self::default()
        }
    }

    /// Set the comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Record the version on a branch.
    pub fn on_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch_name = Some(branch.into());
        self
    }
}

/// A fully prepared insert: key, data, normalized metadata, and the number
/// the writer believes is next.
#[derive(Debug, Clone)]
pub struct CreateVersion {
    /// Owning content item.
    pub key: ContentKey,
    /// Number claimed for the new row.
    pub version_number: i32,
    /// Snapshot to store.
    pub data: Snapshot,
    /// Author.
    pub author_id: Option<UserId>,
    /// Comment, trimmed; empty becomes `None`.
    pub comment: Option<String>,
    /// Normalized tags.
    pub tags: Vec<String>,
    /// Normalized branch name.
    pub branch_name: Option<String>,
    /// Restore provenance.
    pub restored_from: Option<i32>,
    /// Whether the pointer moves in the same transaction.
    pub make_current: bool,
}

impl CreateVersion {
    /// Prepare an insert from caller metadata.
    pub fn new(key: ContentKey, version_number: i32, data: Snapshot, meta: VersionMeta) -> Self {
        Self {
            key,
            version_number,
            data,
            author_id: meta.author_id,
            comment: meta
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            tags: normalize_tags(meta.tags),
            branch_name: normalize_branch_name(meta.branch_name),
            restored_from: meta.restored_from,
            make_current: meta.make_current,
        }
    }

    /// Materialize the row as it will be stored.
    pub fn into_version(self, id: VersionId, created_at: DateTime<Utc>) -> Version {
        Version {
            id,
            content_type: self.key.content_type,
            content_id: self.key.content_id,
            version_number: self.version_number,
            data: self.data,
            created_at,
            author_id: self.author_id,
            comment: self.comment,
            tags: self.tags,
            branch_name: self.branch_name,
            restored_from: self.restored_from,
        }
    }
}

/// Trim, drop empties, de-duplicate, and sort tags.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Map `None`, blank, and `"main"` to the main lineage.
pub fn normalize_branch_name(branch: Option<String>) -> Option<String> {
    branch
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty() && !b.eq_ignore_ascii_case(MAIN_LINEAGE))
}
