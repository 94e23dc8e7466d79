//! CLI command definitions and dispatch.

pub mod branch;
pub mod compare;
pub mod delete;
pub mod history;
pub mod migrate;
pub mod purge;
pub mod restore;
pub mod show;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use revhub_core::config::AppConfig;
use revhub_core::error::AppError;
use revhub_core::types::UserId;
use revhub_service::{AppServices, RequestContext};

/// RevHub: content version history, diffs, restore, and branches
#[derive(Debug, Parser)]
#[command(name = "revhub", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// List a content item's versions
    History(history::HistoryArgs),
    /// Show one version
    Show(show::ShowArgs),
    /// Show a content item's current version
    Current(show::CurrentArgs),
    /// Compare two versions, or one version with the current one
    Compare(compare::CompareArgs),
    /// Restore a version as a new current version
    Restore(restore::RestoreArgs),
    /// Delete a single version
    Delete(delete::DeleteArgs),
    /// Branch management
    Branch(branch::BranchArgs),
    /// Purge old versions
    Purge(purge::PurgeArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let services = AppServices::connect(config).await?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &services).await,
            Commands::History(args) => history::execute(args, &services, self.format).await,
            Commands::Show(args) => show::execute(args, &services, self.format).await,
            Commands::Current(args) => show::execute_current(args, &services, self.format).await,
            Commands::Compare(args) => compare::execute(args, &services, self.format).await,
            Commands::Restore(args) => restore::execute(args, &services, self.format).await,
            Commands::Delete(args) => delete::execute(args, &services).await,
            Commands::Branch(args) => branch::execute(args, &services, self.format).await,
            Commands::Purge(args) => purge::execute(args, &services, self.format).await,
        }
    }
}

/// Helper: the acting user, or the system when none is given
pub fn request_context(user: Option<UserId>) -> RequestContext {
    user.map_or_else(RequestContext::system, RequestContext::new)
}

/// Helper: ask before a destructive change unless `--yes` was passed
pub fn confirm(prompt: &str, yes: bool) -> Result<bool, AppError> {
    if yes {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
    if !confirmed {
        println!("Cancelled.");
    }
    Ok(confirmed)
}
