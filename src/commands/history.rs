//! Version listing and timeline commands.

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use revhub_core::error::AppError;
use revhub_core::types::{ContentKey, PageRequest};
use revhub_entity::{LineageFilter, Version, VersionFilter};
use revhub_service::{AppServices, TimelineEntry};

/// Arguments for the history command
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Content item as `type/id`
    pub key: ContentKey,

    /// Only versions on this lineage (`main` for the main line)
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Only versions carrying this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Case-insensitive comment search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Created at or after (RFC 3339)
    #[arg(long)]
    pub from: Option<DateTime<Utc>>,

    /// Created at or before (RFC 3339)
    #[arg(long)]
    pub to: Option<DateTime<Utc>>,

    /// Page number
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    /// Versions per page
    #[arg(long, default_value_t = 25)]
    pub page_size: u64,

    /// Summarize each version against the one before it instead
    #[arg(long, conflicts_with_all = ["branch", "tag", "search", "from", "to"])]
    pub timeline: bool,
}

/// Version display row for table output
#[derive(Debug, Serialize, Tabled)]
struct VersionRow {
    /// Version number
    #[tabled(rename = "#")]
    number: i32,
    /// Version ID
    id: String,
    /// Created at
    created_at: String,
    /// Author
    author: String,
    /// Branch
    branch: String,
    /// Tags
    tags: String,
    /// Comment
    comment: String,
    /// Current marker
    current: String,
}

impl VersionRow {
    fn new(version: &Version, current: Option<i32>) -> Self {
        Self {
            number: version.version_number,
            id: version.id.to_string(),
            created_at: output::timestamp(&version.created_at),
            author: output::author(version.author_id),
            branch: version.branch_name.clone().unwrap_or_else(|| "main".to_string()),
            tags: version.tags.join(", "),
            comment: version.comment.clone().unwrap_or_default(),
            current: marker(current == Some(version.version_number)),
        }
    }
}

/// Timeline display row for table output
#[derive(Debug, Serialize, Tabled)]
struct TimelineRow {
    /// Version number
    #[tabled(rename = "#")]
    number: i32,
    /// Created at
    created_at: String,
    /// Author
    author: String,
    /// Branch
    branch: String,
    /// Current marker
    current: String,
    /// What changed
    summary: String,
}

impl From<&TimelineEntry> for TimelineRow {
    fn from(entry: &TimelineEntry) -> Self {
        Self {
            number: entry.version_number,
            created_at: output::timestamp(&entry.created_at),
            author: output::author(entry.author_id),
            branch: entry.branch_name.clone().unwrap_or_else(|| "main".to_string()),
            current: marker(entry.is_current),
            summary: entry.summary.clone(),
        }
    }
}

fn marker(is_current: bool) -> String {
    if is_current { "*".to_string() } else { String::new() }
}

/// Execute the history command
pub async fn execute(
    args: &HistoryArgs,
    services: &AppServices,
    format: OutputFormat,
) -> Result<(), AppError> {
    if args.timeline {
        let entries = services.timeline.timeline(&args.key).await?;
        match format {
            OutputFormat::Json => output::print_json(&entries),
            OutputFormat::Table => {
                let rows: Vec<TimelineRow> = entries.iter().map(TimelineRow::from).collect();
                output::print_list(&rows, format);
            }
        }
        return Ok(());
    }

    let mut filter = VersionFilter::default().between(args.from, args.to);
    if let Some(branch) = &args.branch {
        filter = filter.with_branch(LineageFilter::parse(branch));
    }
    if let Some(tag) = &args.tag {
        filter = filter.with_tag(tag);
    }
    if let Some(search) = &args.search {
        filter = filter.with_search(search);
    }

    let page = PageRequest::new(args.page, args.page_size);
    let versions = services.versions.list_versions(&args.key, &filter, &page).await?;

    match format {
        OutputFormat::Json => output::print_json(&versions),
        OutputFormat::Table => {
            let current = services.versions.current_number(&args.key).await?;
            let rows: Vec<VersionRow> = versions
                .items
                .iter()
                .map(|v| VersionRow::new(v, current))
                .collect();
            output::print_list(&rows, format);
            println!(
                "Page {} of {} ({} versions)",
                versions.page, versions.total_pages, versions.total_items
            );
        }
    }

    Ok(())
}
