//! PostgreSQL connection pool.

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use revhub_core::config::DatabaseConfig;
use revhub_core::error::{AppError, ErrorKind};
use revhub_core::result::AppResult;

/// Shared handle to the sqlx pool used by every Postgres repository.
#[derive(Debug, Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Open a pool from configuration. Fails when `database.url` is unset.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        if config.url.trim().is_empty() {
            return Err(AppError::configuration(
                "database.url must be set for the postgres backend",
            ));
        }

        info!(
            url = %mask_password(&config.url),
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to connect to database: {e}"),
                    e,
                )
            })?;

        info!("Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// The underlying sqlx pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query.
    pub async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }

    /// Close all connections.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}

/// Hide the password of a connection URL for logging.
fn mask_password(url: &str) -> String {
    let Some((credentials, host)) = url.rsplit_once('@') else {
        return url.to_string();
    };
    let scheme_end = credentials.find("://").map_or(0, |p| p + 3);
    match credentials[scheme_end..].split_once(':') {
        Some((user, _)) => format!("{}{user}:****@{host}", &credentials[..scheme_end]),
        None => url.to_string(),
    }
}
