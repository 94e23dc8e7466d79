//! PostgreSQL content pointer repository.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use revhub_core::error::{AppError, ErrorKind};
use revhub_core::result::AppResult;
use revhub_core::types::ContentKey;
use revhub_entity::ContentItem;

use crate::traits::ContentRepository;

/// Repository for the `content_items` pointer table.
#[derive(Debug, Clone)]
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    /// Create a new content repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert or move the pointer row on the caller's connection.
pub(crate) async fn upsert_pointer(
    conn: &mut PgConnection,
    key: &ContentKey,
    version_number: i32,
) -> AppResult<ContentItem> {
    sqlx::query_as::<_, ContentItem>(
        "INSERT INTO content_items (content_type, content_id, current_version_number, updated_at) \
         VALUES ($1, $2, $3, NOW()) \
         ON CONFLICT (content_type, content_id) DO UPDATE \
         SET current_version_number = EXCLUDED.current_version_number, \
             updated_at = EXCLUDED.updated_at \
         RETURNING *",
    )
    .bind(&key.content_type)
    .bind(&key.content_id)
    .bind(version_number)
    .fetch_one(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to move current version", e))
}

#[async_trait]
impl ContentRepository for PgContentRepository {
    async fn find(&self, key: &ContentKey) -> AppResult<Option<ContentItem>> {
        sqlx::query_as::<_, ContentItem>(
            "SELECT * FROM content_items WHERE content_type = $1 AND content_id = $2",
        )
        .bind(&key.content_type)
        .bind(&key.content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find content item", e))
    }

    async fn set_current(&self, key: &ContentKey, version_number: i32) -> AppResult<ContentItem> {
        let mut conn = self.pool.acquire().await?;
        upsert_pointer(&mut conn, key, version_number).await
    }
}
