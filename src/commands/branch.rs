//! Branch management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use revhub_core::error::AppError;
use revhub_core::types::{BranchId, ContentKey, UserId, VersionId};
use revhub_diff::render;
use revhub_entity::{Branch, BranchSummary};
use revhub_service::AppServices;

/// Arguments for branch commands
#[derive(Debug, Args)]
pub struct BranchArgs {
    /// Branch subcommand
    #[command(subcommand)]
    pub command: BranchCommand,
}

/// Branch subcommands
#[derive(Debug, Subcommand)]
pub enum BranchCommand {
    /// Create a branch forked at a version
    Create {
        /// Content item as `type/id`
        key: ContentKey,
        /// Branch name
        name: String,
        /// Version to fork from
        #[arg(short, long)]
        base: VersionId,
        /// Make it the item's default branch
        #[arg(long)]
        default: bool,
        /// Acting user; system when omitted
        #[arg(short, long)]
        user: Option<UserId>,
    },
    /// List a content item's branches
    List {
        /// Content item as `type/id`
        key: ContentKey,
        /// Include archived branches
        #[arg(short, long)]
        all: bool,
    },
    /// Compare a branch head with the current version
    Compare {
        /// Branch ID
        id: BranchId,
    },
    /// Merge a branch into the main line
    Merge {
        /// Branch ID
        id: BranchId,
        /// Leave the branch active after merging
        #[arg(long)]
        keep: bool,
        /// Acting user; system when omitted
        #[arg(short, long)]
        user: Option<UserId>,
    },
    /// Archive a branch
    Archive {
        /// Branch ID
        id: BranchId,
    },
    /// Reactivate an archived branch
    Reactivate {
        /// Branch ID
        id: BranchId,
    },
    /// Make a branch the item's default
    SetDefault {
        /// Branch ID
        id: BranchId,
    },
}

/// Branch display row for table output
#[derive(Debug, Serialize, Tabled)]
struct BranchRow {
    /// Branch ID
    id: String,
    /// Name
    name: String,
    /// Base version number
    base: i32,
    /// Head version number
    head: i32,
    /// Default marker
    default: String,
    /// Status
    status: String,
    /// Created at
    created_at: String,
}

impl From<&BranchSummary> for BranchRow {
    fn from(summary: &BranchSummary) -> Self {
        let branch = &summary.branch;
        Self {
            id: branch.id.to_string(),
            name: branch.name.clone(),
            base: summary.base_version.version_number,
            head: summary.head().version_number,
            default: if branch.is_default { "*".to_string() } else { String::new() },
            status: status(branch).to_string(),
            created_at: output::timestamp(&branch.created_at),
        }
    }
}

fn status(branch: &Branch) -> &'static str {
    if branch.is_active { "active" } else { "archived" }
}

/// Execute branch commands
pub async fn execute(
    args: &BranchArgs,
    services: &AppServices,
    format: OutputFormat,
) -> Result<(), AppError> {
    let manager = &services.branches;

    match &args.command {
        BranchCommand::Create {
            key,
            name,
            base,
            default,
            user,
        } => {
            let ctx = super::request_context(*user);
            let branch = manager.create_branch(&ctx, key, name, *base, *default).await?;
            print_branch(&branch, "Created", format);
        }
        BranchCommand::List { key, all } => {
            let summaries = if *all {
                manager.list_all_branches(key).await?
            } else {
                manager.list_branches(key).await?
            };
            match format {
                OutputFormat::Json => output::print_json(&summaries),
                OutputFormat::Table => {
                    let rows: Vec<BranchRow> = summaries.iter().map(BranchRow::from).collect();
                    output::print_list(&rows, format);
                }
            }
        }
        BranchCommand::Compare { id } => {
            let result = manager.compare_branch(*id).await?;
            match format {
                OutputFormat::Json => output::print_json(&result),
                OutputFormat::Table => {
                    println!(
                        "Branch '{}': head version {} against current version {}",
                        result.branch.name, result.head_version_number, result.main_version_number
                    );
                    print!("{}", render(&result.comparison.diff));
                    for conflict in &result.conflicts {
                        output::print_warning(&format!(
                            "'{}' was changed on both sides; merging keeps the branch value",
                            conflict.field
                        ));
                    }
                }
            }
        }
        BranchCommand::Merge { id, keep, user } => {
            let ctx = super::request_context(*user);
            let merged = manager.merge_branch(&ctx, *id, !keep).await?;
            match format {
                OutputFormat::Json => output::print_json(&merged),
                OutputFormat::Table => output::print_success(&format!(
                    "Merged into {} as version {}",
                    merged.key(),
                    merged.version_number
                )),
            }
        }
        BranchCommand::Archive { id } => {
            let branch = manager.archive_branch(*id).await?;
            print_branch(&branch, "Archived", format);
        }
        BranchCommand::Reactivate { id } => {
            let branch = manager.reactivate_branch(*id).await?;
            print_branch(&branch, "Reactivated", format);
        }
        BranchCommand::SetDefault { id } => {
            let branch = manager.set_default(*id).await?;
            print_branch(&branch, "Set default", format);
        }
    }

    Ok(())
}

fn print_branch(branch: &Branch, action: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(branch),
        OutputFormat::Table => output::print_success(&format!(
            "{action} branch '{}' of {} ({})",
            branch.name,
            branch.key(),
            branch.id
        )),
    }
}
