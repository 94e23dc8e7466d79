//! Version comparison command.

use clap::Args;

use crate::output::{self, OutputFormat};
use revhub_core::error::AppError;
use revhub_core::types::VersionId;
use revhub_diff::render;
use revhub_service::AppServices;

/// Arguments for the compare command
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Version treated as old
    pub old: VersionId,

    /// Version treated as new; the item's current version when omitted
    pub new: Option<VersionId>,
}

/// Execute the compare command
pub async fn execute(
    args: &CompareArgs,
    services: &AppServices,
    format: OutputFormat,
) -> Result<(), AppError> {
    let comparison = match args.new {
        Some(new) => services.comparison.compare_versions(args.old, new).await?,
        None => services.comparison.compare_with_current(args.old).await?,
    };

    match format {
        OutputFormat::Json => output::print_json(&comparison),
        OutputFormat::Table => {
            println!(
                "{}: version {} → version {}",
                comparison.key, comparison.old_version_number, comparison.new_version_number
            );
            print!("{}", render(&comparison.diff));
        }
    }
    Ok(())
}
