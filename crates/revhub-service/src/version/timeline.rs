//! Human-readable history of a content item.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use revhub_core::error::ErrorKind;
use revhub_core::result::AppResult;
use revhub_core::types::{ContentKey, UserId, VersionId};
use revhub_diff::DiffEngine;
use revhub_entity::Version;

use super::service::VersionService;

/// Summary for a version whose diff exceeds the engine's bounds.
pub const TOO_LARGE: &str = "Changes too large to summarize";

/// One row of a version timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub id: VersionId,
    pub version_number: i32,
    pub created_at: DateTime<Utc>,
    pub author_id: Option<UserId>,
    pub branch_name: Option<String>,
    pub is_current: bool,
    /// What changed, in a few words.
    pub summary: String,
}

/// Builds timelines from a content item's versions.
#[derive(Debug, Clone)]
pub struct VersionTimeline {
    versions: Arc<VersionService>,
    engine: Arc<DiffEngine>,
}

impl VersionTimeline {
    /// Creates a new timeline builder.
    pub fn new(versions: Arc<VersionService>, engine: Arc<DiffEngine>) -> Self {
        Self { versions, engine }
    }

    /// Every version of the item, newest first, each summarized against the
    /// version on record just before it.
    pub async fn timeline(&self, key: &ContentKey) -> AppResult<Vec<TimelineEntry>> {
        let history = self.versions.list_all(key).await?;
        let current = self.versions.current_number(key).await?;

        let mut entries = Vec::with_capacity(history.len());
        for (i, version) in history.iter().enumerate() {
            let previous = history.get(i + 1);
            entries.push(TimelineEntry {
                id: version.id,
                version_number: version.version_number,
                created_at: version.created_at,
                author_id: version.author_id,
                branch_name: version.branch_name.clone(),
                is_current: current == Some(version.version_number),
                summary: self.summarize(version, previous)?,
            });
        }
        Ok(entries)
    }

    fn summarize(&self, version: &Version, previous: Option<&Version>) -> AppResult<String> {
        if let Some(from) = version.restored_from {
            return Ok(format!("Restored from version {from}"));
        }
        match previous {
            None if version.version_number == 1 => Ok("Initial version".to_string()),
            None => Ok("Earlier history purged".to_string()),
            Some(previous) => match self.engine.compare(&previous.data, &version.data) {
                Ok(diff) => Ok(DiffEngine::diff_stats(&diff).summary()),
                Err(err) if err.is(ErrorKind::Validation) => {
                    warn!(
                        content_type = %version.content_type,
                        content_id = %version.content_id,
                        version_number = version.version_number,
                        error = %err,
                        "Version too large to summarize"
                    );
                    Ok(TOO_LARGE.to_string())
                }
                Err(err) => Err(err),
            },
        }
    }
}
