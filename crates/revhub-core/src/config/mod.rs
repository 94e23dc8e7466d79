//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod database;
pub mod diff;
pub mod logging;
pub mod retention;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::database::{DatabaseConfig, StoreBackend};
pub use self::diff::DiffConfig;
pub use self::logging::LoggingConfig;
pub use self::retention::RetentionConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged configuration sources
/// (base file, environment overlay, `REVHUB__*` environment variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Persistence backend settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Diff engine settings.
    #[serde(default)]
    pub diff: DiffConfig,
    /// Version retention settings.
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl AppConfig {
    /// Load configuration from a base file plus an optional environment overlay.
    ///
    /// `path` is the base file (extension optional). When `env` is given,
    /// `config/{env}` is layered on top. Environment variables prefixed with
    /// `REVHUB__` win over both, using `__` as the section separator
    /// (`REVHUB__DATABASE__URL`).
    pub fn load(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        debug!(path, env, "Loading configuration");

        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(env) = env {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{env}")).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("REVHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("diff.text_fields")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
