//! PostgreSQL branch repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use revhub_core::error::{AppError, ErrorKind};
use revhub_core::result::AppResult;
use revhub_core::types::{BranchId, ContentKey, VersionId};
use revhub_entity::{Branch, CreateBranch, CreateVersion, Version};

use super::version::insert_version;
use crate::traits::BranchRepository;

/// Repository for `content_branches`.
#[derive(Debug, Clone)]
pub struct PgBranchRepository {
    pool: PgPool,
}

impl PgBranchRepository {
    /// Create a new branch repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Unique constraint on `(content_type, content_id, name)`.
const NAME_CONSTRAINT: &str = "uq_content_branches_name";

/// Partial unique index allowing one default branch per item.
const DEFAULT_INDEX: &str = "uq_content_branches_default";

/// Name which unique constraint a failed branch insert hit.
fn insert_failed(err: sqlx::Error, data: &CreateBranch) -> AppError {
    let constraint = err
        .as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_owned);
    let err = AppError::from(err);
    if !err.is(ErrorKind::Conflict) {
        return err;
    }
    match constraint.as_deref() {
        Some(NAME_CONSTRAINT) => AppError {
            kind: ErrorKind::Validation,
            message: format!("Branch '{}' already exists for {}", data.name, data.key),
            ..err
        },
        Some(DEFAULT_INDEX) => AppError {
            message: format!("Another default branch of {} was set concurrently", data.key),
            ..err
        },
        _ => err,
    }
}

/// Drop the default flag from every branch of the item.
async fn clear_defaults(conn: &mut PgConnection, content_type: &str, content_id: &str) -> AppResult<()> {
    sqlx::query(
        "UPDATE content_branches SET is_default = FALSE \
         WHERE content_type = $1 AND content_id = $2 AND is_default",
    )
    .bind(content_type)
    .bind(content_id)
    .execute(conn)
    .await
    .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear default branch", e))?;
    Ok(())
}

#[async_trait]
impl BranchRepository for PgBranchRepository {
    async fn find_by_id(&self, id: BranchId) -> AppResult<Option<Branch>> {
        sqlx::query_as::<_, Branch>("SELECT * FROM content_branches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find branch", e))
    }

    async fn find_by_name(&self, key: &ContentKey, name: &str) -> AppResult<Option<Branch>> {
        sqlx::query_as::<_, Branch>(
            "SELECT * FROM content_branches \
             WHERE content_type = $1 AND content_id = $2 AND name = $3",
        )
        .bind(&key.content_type)
        .bind(&key.content_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find branch", e))
    }

    async fn list(&self, key: &ContentKey, include_archived: bool) -> AppResult<Vec<Branch>> {
        debug!(key = %key, include_archived, "Listing branches");
        sqlx::query_as::<_, Branch>(
            "SELECT * FROM content_branches \
             WHERE content_type = $1 AND content_id = $2 AND ($3 OR is_active) \
             ORDER BY created_at ASC, name ASC",
        )
        .bind(&key.content_type)
        .bind(&key.content_id)
        .bind(include_archived)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list branches", e))
    }

    async fn insert(&self, data: CreateBranch) -> AppResult<Branch> {
        let mut tx = self.pool.begin().await?;

        if data.is_default {
            clear_defaults(&mut tx, &data.key.content_type, &data.key.content_id).await?;
        }

        let branch = sqlx::query_as::<_, Branch>(
            "INSERT INTO content_branches (id, content_type, content_id, name, base_version_id, \
             is_default, is_active, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8) RETURNING *",
        )
        .bind(BranchId::new())
        .bind(&data.key.content_type)
        .bind(&data.key.content_id)
        .bind(&data.name)
        .bind(data.base_version_id)
        .bind(data.is_default)
        .bind(data.created_by)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| insert_failed(e, &data))?;

        tx.commit().await?;
        Ok(branch)
    }

    async fn set_default(&self, id: BranchId) -> AppResult<Branch> {
        let mut tx = self.pool.begin().await?;

        let branch = sqlx::query_as::<_, Branch>(
            "SELECT * FROM content_branches WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Branch {id} not found")))?;

        clear_defaults(&mut tx, &branch.content_type, &branch.content_id).await?;

        let branch = sqlx::query_as::<_, Branch>(
            "UPDATE content_branches SET is_default = TRUE WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(branch)
    }

    async fn set_active(&self, id: BranchId, active: bool) -> AppResult<Branch> {
        sqlx::query_as::<_, Branch>(
            "UPDATE content_branches \
             SET is_active = $2, is_default = is_default AND $2 \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update branch", e))?
        .ok_or_else(|| AppError::not_found(format!("Branch {id} not found")))
    }

    async fn is_base(&self, version_id: VersionId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM content_branches WHERE base_version_id = $1)",
        )
        .bind(version_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to check branch bases", e))
    }

    async fn merge(&self, data: CreateVersion, archive: Option<BranchId>) -> AppResult<Version> {
        let mut tx = self.pool.begin().await?;

        let version = insert_version(
            &mut tx,
            CreateVersion {
                make_current: true,
                ..data
            },
        )
        .await?;

        if let Some(branch_id) = archive {
            let archived = sqlx::query(
                "UPDATE content_branches SET is_active = FALSE, is_default = FALSE WHERE id = $1",
            )
            .bind(branch_id)
            .execute(&mut *tx)
            .await?;
            if archived.rows_affected() == 0 {
                return Err(AppError::not_found(format!("Branch {branch_id} not found")));
            }
        }

        tx.commit().await?;
        Ok(version)
    }
}
