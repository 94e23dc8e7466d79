//! Content item pointer row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use revhub_core::types::ContentKey;

/// The owning entity's view of its history: which version is active.
///
/// The content itself lives elsewhere; RevHub only keeps the pointer so
/// restore, merge, and retention can honor it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ContentItem {
    /// Schema tag of the owning entity.
    pub content_type: String,
    /// Identifier of the owning entity.
    pub content_id: String,
    /// Version number of the active version.
    pub current_version_number: i32,
    /// When the pointer last moved.
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// The key this pointer belongs to.
    pub fn key(&self) -> ContentKey {
        ContentKey {
            content_type: self.content_type.clone(),
            content_id: self.content_id.clone(),
        }
    }
}
