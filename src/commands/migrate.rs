//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use revhub_core::error::AppError;
use revhub_database::migration::run_migrations;
use revhub_service::AppServices;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check that the database answers
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, services: &AppServices) -> Result<(), AppError> {
    let Some(pool) = services.store.pool() else {
        output::print_warning("The in-memory backend has no schema to migrate.");
        return Ok(());
    };

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            run_migrations(pool.pool()).await?;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::Check => {
            pool.health_check().await?;
            output::print_success("Database is reachable.");
        }
    }

    pool.close().await;
    Ok(())
}
