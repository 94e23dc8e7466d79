//! Single-version delete command.

use clap::Args;

use crate::output;
use revhub_core::error::AppError;
use revhub_core::types::VersionId;
use revhub_service::AppServices;

/// Arguments for the delete command
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Version to delete
    pub id: VersionId,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Execute the delete command
pub async fn execute(args: &DeleteArgs, services: &AppServices) -> Result<(), AppError> {
    let version = services.versions.get_version(args.id).await?;
    let label = format!("{} version {}", version.key(), version.version_number);

    if !super::confirm(&format!("Delete {label}? This cannot be undone."), args.yes)? {
        return Ok(());
    }

    services.versions.delete_version(args.id).await?;
    output::print_success(&format!("Deleted {label}"));
    Ok(())
}
