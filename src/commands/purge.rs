//! Retention commands.

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{self, OutputFormat};
use revhub_core::error::AppError;
use revhub_core::types::ContentKey;
use revhub_service::AppServices;

/// Arguments for purge commands
#[derive(Debug, Args)]
pub struct PurgeArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Purge subcommand
    #[command(subcommand)]
    pub command: PurgeCommand,
}

/// Purge subcommands
#[derive(Debug, Subcommand)]
pub enum PurgeCommand {
    /// Delete versions older than a number of days
    OlderThan {
        /// Content item as `type/id`
        key: ContentKey,
        /// Age in days; the configured maximum age when omitted
        days: Option<u32>,
    },
    /// Delete versions created before a point in time
    Before {
        /// Content item as `type/id`
        key: ContentKey,
        /// Cutoff (RFC 3339)
        cutoff: DateTime<Utc>,
    },
    /// Keep only the newest versions
    KeepLatest {
        /// Content item as `type/id`
        key: ContentKey,
        /// How many to keep; the configured count when omitted
        #[arg(short, long)]
        keep: Option<u32>,
    },
}

#[derive(Debug, Serialize)]
struct PurgeReport<'a> {
    key: &'a ContentKey,
    deleted: u64,
}

/// Execute purge commands
pub async fn execute(
    args: &PurgeArgs,
    services: &AppServices,
    format: OutputFormat,
) -> Result<(), AppError> {
    let retention = &services.retention;
    let (key, description) = match &args.command {
        PurgeCommand::OlderThan { key, days } => {
            let days = days.unwrap_or(services.config.retention.max_age_days);
            (key, format!("versions older than {days} days"))
        }
        PurgeCommand::Before { key, cutoff } => (key, format!("versions created before {cutoff}")),
        PurgeCommand::KeepLatest { key, keep } => {
            let keep = keep.unwrap_or(services.config.retention.keep_latest);
            (key, format!("all but the newest {keep} versions"))
        }
    };

    let prompt = format!("Delete {description} of {key}? This cannot be undone.");
    if !super::confirm(&prompt, args.yes)? {
        return Ok(());
    }

    let deleted = match &args.command {
        PurgeCommand::OlderThan { key, days: Some(days) } => {
            retention.purge_older_than(key, *days).await?
        }
        PurgeCommand::OlderThan { key, days: None } => retention.purge_expired(key).await?,
        PurgeCommand::Before { key, cutoff } => retention.purge_before(key, *cutoff).await?,
        PurgeCommand::KeepLatest { key, keep } => retention.keep_latest(key, *keep).await?,
    };

    match format {
        OutputFormat::Json => output::print_json(&PurgeReport { key, deleted }),
        OutputFormat::Table if deleted == 0 => {
            output::print_warning(&format!("Nothing to purge for {key}"));
        }
        OutputFormat::Table => {
            output::print_success(&format!("Deleted {deleted} versions of {key}"));
        }
    }
    Ok(())
}
