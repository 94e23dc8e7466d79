//! Purging old versions without touching protected ones.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use revhub_core::config::RetentionConfig;
use revhub_core::result::AppResult;
use revhub_core::types::ContentKey;
use revhub_database::{PurgeRule, VersionRepository};

/// Deletes old versions of a content item.
///
/// The current version, version 1, and every branch base survive any
/// purge. Finding nothing to delete is not an error.
#[derive(Debug, Clone)]
pub struct RetentionService {
    versions: Arc<dyn VersionRepository>,
    config: RetentionConfig,
}

impl RetentionService {
    /// Creates a new retention service.
    pub fn new(versions: Arc<dyn VersionRepository>, config: RetentionConfig) -> Self {
        Self { versions, config }
    }

    /// Delete versions older than `days` days. Returns how many were removed.
    pub async fn purge_older_than(&self, key: &ContentKey, days: u32) -> AppResult<u64> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        self.purge_before(key, cutoff).await
    }

    /// Delete versions older than the configured `max_age_days`.
    pub async fn purge_expired(&self, key: &ContentKey) -> AppResult<u64> {
        self.purge_older_than(key, self.config.max_age_days).await
    }

    /// Delete versions created strictly before `cutoff`.
    pub async fn purge_before(&self, key: &ContentKey, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let removed = self
            .versions
            .purge(key, PurgeRule::CreatedBefore(cutoff))
            .await?;
        info!(
            content_type = %key.content_type,
            content_id = %key.content_id,
            cutoff = %cutoff,
            removed,
            "Purged versions by age"
        );
        Ok(removed)
    }

    /// Keep only the newest `keep` versions, or the configured count when
    /// `keep` is `None`.
    pub async fn keep_latest(&self, key: &ContentKey, keep: Option<u32>) -> AppResult<u64> {
        let keep = keep.unwrap_or(self.config.keep_latest);
        let removed = self.versions.purge(key, PurgeRule::KeepLatest(keep)).await?;
        info!(
            content_type = %key.content_type,
            content_id = %key.content_id,
            keep,
            removed,
            "Purged versions by count"
        );
        Ok(removed)
    }
}
