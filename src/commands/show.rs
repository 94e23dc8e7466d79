//! Single-version display commands.

use clap::Args;

use crate::output::{self, OutputFormat};
use revhub_core::error::AppError;
use revhub_core::types::{ContentKey, VersionId};
use revhub_entity::Version;
use revhub_service::AppServices;

/// Arguments for the show command
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Version ID
    pub id: VersionId,
}

/// Arguments for the current command
#[derive(Debug, Args)]
pub struct CurrentArgs {
    /// Content item as `type/id`
    pub key: ContentKey,
}

/// Execute the show command
pub async fn execute(
    args: &ShowArgs,
    services: &AppServices,
    format: OutputFormat,
) -> Result<(), AppError> {
    let version = services.versions.get_version(args.id).await?;
    let current = services.versions.current_number(&version.key()).await?;
    print_version(&version, current == Some(version.version_number), format)
}

/// Execute the current command
pub async fn execute_current(
    args: &CurrentArgs,
    services: &AppServices,
    format: OutputFormat,
) -> Result<(), AppError> {
    let version = services.versions.current_version(&args.key).await?;
    print_version(&version, true, format)
}

fn print_version(version: &Version, is_current: bool, format: OutputFormat) -> Result<(), AppError> {
    if format == OutputFormat::Json {
        output::print_json(version);
        return Ok(());
    }

    println!("{} version {}", version.key(), version.version_number);
    output::print_kv("ID", &version.id.to_string());
    output::print_kv("Created", &output::timestamp(&version.created_at));
    output::print_kv("Author", &output::author(version.author_id));
    output::print_kv("Branch", version.branch_name.as_deref().unwrap_or("main"));
    output::print_kv("Current", if is_current { "yes" } else { "no" });
    if let Some(comment) = &version.comment {
        output::print_kv("Comment", comment);
    }
    if !version.tags.is_empty() {
        output::print_kv("Tags", &version.tags.join(", "));
    }
    if let Some(from) = version.restored_from {
        output::print_kv("Restored from", &from.to_string());
    }
    println!("{}", serde_json::to_string_pretty(&version.data)?);
    Ok(())
}
