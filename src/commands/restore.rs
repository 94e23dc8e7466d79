//! Restore command.

use clap::Args;

use crate::output::{self, OutputFormat};
use revhub_core::error::AppError;
use revhub_core::types::{UserId, VersionId};
use revhub_service::AppServices;

/// Arguments for the restore command
#[derive(Debug, Args)]
pub struct RestoreArgs {
    /// Version to restore
    pub id: VersionId,

    /// Acting user; system when omitted
    #[arg(short, long)]
    pub user: Option<UserId>,
}

/// Execute the restore command
pub async fn execute(
    args: &RestoreArgs,
    services: &AppServices,
    format: OutputFormat,
) -> Result<(), AppError> {
    let ctx = super::request_context(args.user);
    let restored = services.restore.restore_version(&ctx, args.id).await?;

    match format {
        OutputFormat::Json => output::print_json(&restored),
        OutputFormat::Table => output::print_success(&format!(
            "Restored {} version {} as version {}",
            restored.key(),
            restored.restored_from.unwrap_or_default(),
            restored.version_number
        )),
    }
    Ok(())
}
