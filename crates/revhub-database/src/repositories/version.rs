//! PostgreSQL version repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use revhub_core::error::{AppError, ErrorKind};
use revhub_core::result::AppResult;
use revhub_core::types::{ContentKey, PageRequest, PageResponse, VersionId};
use revhub_entity::{CreateVersion, LineageFilter, Version, VersionFilter};

use super::content::upsert_pointer;
use crate::traits::{PurgeRule, VersionRepository};

/// Shared `WHERE` clause of the filtered listing. `$3`..`$7` are the
/// optional criteria; a `NULL` parameter disables its criterion.
const FILTER_CLAUSE: &str = "content_type = $1 AND content_id = $2 \
     AND ($3::timestamptz IS NULL OR created_at >= $3) \
     AND ($4::timestamptz IS NULL OR created_at <= $4) \
     AND ($5::text IS NULL OR $5 = ANY(tags)) \
     AND ($6::text IS NULL OR ($6 = '' AND branch_name IS NULL) OR branch_name = $6) \
     AND ($7::text IS NULL OR strpos(lower(COALESCE(comment, '')), $7) > 0)";

/// Purge statement without its rule. Leaves version 1, the current version
/// (the newest one when the item has no pointer row), and branch bases.
const PURGE_STATEMENT: &str = "DELETE FROM content_versions v \
     WHERE v.content_type = $1 AND v.content_id = $2 \
     AND v.version_number <> 1 \
     AND v.version_number <> COALESCE( \
         (SELECT i.current_version_number FROM content_items i \
          WHERE i.content_type = $1 AND i.content_id = $2), \
         (SELECT MAX(m.version_number) FROM content_versions m \
          WHERE m.content_type = $1 AND m.content_id = $2)) \
     AND NOT EXISTS (SELECT 1 FROM content_branches b WHERE b.base_version_id = v.id)";

/// Repository for version rows.
#[derive(Debug, Clone)]
pub struct PgVersionRepository {
    pool: PgPool,
}

impl PgVersionRepository {
    /// Create a new version repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Filter criteria flattened into bind parameters.
struct FilterParams {
    created_from: Option<DateTime<Utc>>,
    created_to: Option<DateTime<Utc>>,
    tag: Option<String>,
    lineage: Option<String>,
    search: Option<String>,
}

impl FilterParams {
    fn from_filter(filter: &VersionFilter) -> Self {
        let lineage = match &filter.branch {
            LineageFilter::Any => None,
            LineageFilter::Main => Some(String::new()),
            LineageFilter::Branch(name) => Some(name.clone()),
        };
        Self {
            created_from: filter.created_from,
            created_to: filter.created_to,
            tag: filter
                .tag
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from),
            lineage,
            search: filter.search_term(),
        }
    }
}

/// Insert a version row and, when requested, move the pointer. Runs on
/// the caller's connection so it can join an open transaction.
pub(crate) async fn insert_version(conn: &mut PgConnection, data: CreateVersion) -> AppResult<Version> {
    let key = data.key.clone();
    let number = data.version_number;
    let make_current = data.make_current;

    let version = sqlx::query_as::<_, Version>(
        "INSERT INTO content_versions (id, content_type, content_id, version_number, data, \
         created_at, author_id, comment, tags, branch_name, restored_from) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
    )
    .bind(VersionId::new())
    .bind(&data.key.content_type)
    .bind(&data.key.content_id)
    .bind(data.version_number)
    .bind(sqlx::types::Json(&data.data))
    .bind(Utc::now())
    .bind(data.author_id)
    .bind(&data.comment)
    .bind(&data.tags)
    .bind(&data.branch_name)
    .bind(data.restored_from)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| number_taken(e, &key, number))?;

    if make_current {
        upsert_pointer(&mut *conn, &key, number).await?;
    }

    Ok(version)
}

/// Give a lost numbering race a message naming the item and number.
fn number_taken(err: sqlx::Error, key: &ContentKey, number: i32) -> AppError {
    let err = AppError::from(err);
    if err.is(ErrorKind::Conflict) {
        AppError {
            message: format!("Version {number} of {key} was created concurrently"),
            ..err
        }
    } else {
        err
    }
}

#[async_trait]
impl VersionRepository for PgVersionRepository {
    async fn find_by_id(&self, id: VersionId) -> AppResult<Option<Version>> {
        sqlx::query_as::<_, Version>("SELECT * FROM content_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn find_by_number(&self, key: &ContentKey, number: i32) -> AppResult<Option<Version>> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM content_versions \
             WHERE content_type = $1 AND content_id = $2 AND version_number = $3",
        )
        .bind(&key.content_type)
        .bind(&key.content_id)
        .bind(number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find version", e))
    }

    async fn latest_number(&self, key: &ContentKey) -> AppResult<i32> {
        let max: Option<i32> = sqlx::query_scalar(
            "SELECT MAX(version_number) FROM content_versions \
             WHERE content_type = $1 AND content_id = $2",
        )
        .bind(&key.content_type)
        .bind(&key.content_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to read latest version number", e)
        })?;
        Ok(max.unwrap_or(0))
    }

    async fn latest_on_branch(&self, key: &ContentKey, branch: &str) -> AppResult<Option<Version>> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM content_versions \
             WHERE content_type = $1 AND content_id = $2 AND branch_name = $3 \
             ORDER BY version_number DESC LIMIT 1",
        )
        .bind(&key.content_type)
        .bind(&key.content_id)
        .bind(branch)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find branch head", e)
        })
    }

    async fn insert(&self, data: CreateVersion) -> AppResult<Version> {
        let mut tx = self.pool.begin().await?;
        let version = insert_version(&mut tx, data).await?;
        tx.commit().await?;
        Ok(version)
    }

    async fn list(
        &self,
        key: &ContentKey,
        filter: &VersionFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Version>> {
        let params = FilterParams::from_filter(filter);
        debug!(key = %key, ?filter, page = page.page, "Listing versions");

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM content_versions WHERE {FILTER_CLAUSE}"
        ))
        .bind(&key.content_type)
        .bind(&key.content_id)
        .bind(params.created_from)
        .bind(params.created_to)
        .bind(&params.tag)
        .bind(&params.lineage)
        .bind(&params.search)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count versions", e))?;

        let versions = sqlx::query_as::<_, Version>(&format!(
            "SELECT * FROM content_versions WHERE {FILTER_CLAUSE} \
             ORDER BY version_number DESC LIMIT $8 OFFSET $9"
        ))
        .bind(&key.content_type)
        .bind(&key.content_id)
        .bind(params.created_from)
        .bind(params.created_to)
        .bind(&params.tag)
        .bind(&params.lineage)
        .bind(&params.search)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))?;

        Ok(PageResponse::new(
            versions,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn list_all(&self, key: &ContentKey) -> AppResult<Vec<Version>> {
        sqlx::query_as::<_, Version>(
            "SELECT * FROM content_versions WHERE content_type = $1 AND content_id = $2 \
             ORDER BY version_number DESC",
        )
        .bind(&key.content_type)
        .bind(&key.content_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list versions", e))
    }

    async fn count(&self, key: &ContentKey) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM content_versions WHERE content_type = $1 AND content_id = $2",
        )
        .bind(&key.content_type)
        .bind(&key.content_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count versions", e))?;
        Ok(count as u64)
    }

    async fn delete(&self, id: VersionId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM content_versions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete version", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn purge(&self, key: &ContentKey, rule: PurgeRule) -> AppResult<u64> {
        let result = match rule {
            PurgeRule::CreatedBefore(cutoff) => {
                let sql = format!("{PURGE_STATEMENT} AND v.created_at < $3");
                sqlx::query(&sql)
                    .bind(&key.content_type)
                    .bind(&key.content_id)
                    .bind(cutoff)
                    .execute(&self.pool)
                    .await
            }
            PurgeRule::KeepLatest(keep) => {
                let sql = format!(
                    "{PURGE_STATEMENT} AND v.version_number <= \
                     (SELECT MAX(k.version_number) FROM content_versions k \
                      WHERE k.content_type = $1 AND k.content_id = $2) - $3"
                );
                sqlx::query(&sql)
                    .bind(&key.content_type)
                    .bind(&key.content_id)
                    .bind(i64::from(keep))
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to purge versions", e))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_params_flatten_lineage() {
        let any = FilterParams::from_filter(&VersionFilter::default());
        assert_eq!(any.lineage, None);
        assert_eq!(any.search, None);

        let main = FilterParams::from_filter(&VersionFilter::default().with_branch(LineageFilter::Main));
        assert_eq!(main.lineage.as_deref(), Some(""));

        let named = FilterParams::from_filter(
            &VersionFilter::default()
                .with_branch(LineageFilter::Branch("redesign".into()))
                .with_search("  Typo ")
                .with_tag(" "),
        );
        assert_eq!(named.lineage.as_deref(), Some("redesign"));
        assert_eq!(named.search.as_deref(), Some("typo"));
        assert_eq!(named.tag, None);
    }
}
