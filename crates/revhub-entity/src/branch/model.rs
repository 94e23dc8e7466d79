//! Branch entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use revhub_core::error::AppError;
use revhub_core::types::{BranchId, ContentKey, UserId, VersionId};

use crate::version::Version;
use crate::version::model::MAIN_LINEAGE;

/// Maximum branch name length.
const MAX_NAME_LEN: usize = 100;

/// A named lineage over a content item's history.
///
/// Branches never copy history; versions written "on" a branch carry its
/// name in `branch_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Branch {
    /// Unique branch identifier.
    pub id: BranchId,
    /// Schema tag of the owning entity.
    pub content_type: String,
    /// Identifier of the owning entity.
    pub content_id: String,
    /// Name, unique within the content item.
    pub name: String,
    /// The version this branch forked from.
    pub base_version_id: VersionId,
    /// At most one branch per content item is the default.
    pub is_default: bool,
    /// Archived branches are hidden from active listings.
    pub is_active: bool,
    /// Who created the branch.
    pub created_by: Option<UserId>,
    /// When the branch was created.
    pub created_at: DateTime<Utc>,
}

impl Branch {
    /// The content item this branch belongs to.
    pub fn key(&self) -> ContentKey {
        ContentKey {
            content_type: self.content_type.clone(),
            content_id: self.content_id.clone(),
        }
    }
}

/// Input for creating a branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBranch {
    /// Owning content item.
    pub key: ContentKey,
    /// Branch name; validated with [`CreateBranch::validate_name`].
    pub name: String,
    /// Version to fork from.
    pub base_version_id: VersionId,
    /// Make this the default branch.
    #[serde(default)]
    pub is_default: bool,
    /// Creator.
    pub created_by: Option<UserId>,
}

impl CreateBranch {
    /// Trim and check a branch name.
    pub fn validate_name(name: &str) -> Result<String, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::validation("Branch name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::validation(format!(
                "Branch name is limited to {MAX_NAME_LEN} characters"
            )));
        }
        if name.eq_ignore_ascii_case(MAIN_LINEAGE) {
            return Err(AppError::validation(format!(
                "'{name}' is reserved for the main lineage"
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(AppError::validation("Branch name contains control characters"));
        }
        Ok(name.to_string())
    }

    /// Materialize the row as it will be stored.
    pub fn into_branch(self, id: BranchId, created_at: DateTime<Utc>) -> Branch {
        Branch {
            id,
            content_type: self.key.content_type,
            content_id: self.key.content_id,
            name: self.name,
            base_version_id: self.base_version_id,
            is_default: self.is_default,
            is_active: true,
            created_by: self.created_by,
            created_at,
        }
    }
}

/// A branch annotated with its base version and its newest version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchSummary {
    /// The branch row.
    pub branch: Branch,
    /// The version the branch forked from.
    pub base_version: Version,
    /// Highest-numbered version carrying the branch name, if any.
    pub latest_version: Option<Version>,
}

impl BranchSummary {
    /// The version a reader of the branch sees: its newest write, or the
    /// base when nothing was written on it yet.
    pub fn head(&self) -> &Version {
        self.latest_version.as_ref().unwrap_or(&self.base_version)
    }
}
