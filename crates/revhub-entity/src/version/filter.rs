//! Filters for listing a content item's versions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{Version, normalize_branch_name};

/// Which lineage a listing is restricted to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum LineageFilter {
    /// Every version regardless of branch.
    #[default]
    Any,
    /// Only versions on the main lineage.
    Main,
    /// Only versions recorded on the named branch.
    Branch(String),
}

impl LineageFilter {
    /// Interpret a user-supplied branch parameter.
    ///
    /// Empty or `"main"` selects the main lineage; anything else a branch.
    pub fn parse(value: &str) -> Self {
        match normalize_branch_name(Some(value.to_string())) {
            Some(name) => Self::Branch(name),
            None => Self::Main,
        }
    }

    /// Whether `branch_name` falls within this lineage selection.
    pub fn matches(&self, branch_name: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Main => branch_name.is_none(),
            Self::Branch(name) => branch_name == Some(name.as_str()),
        }
    }
}

/// Criteria for `list_versions`. All set criteria must hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionFilter {
    /// Inclusive lower bound on `created_at`.
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`.
    pub created_to: Option<DateTime<Utc>>,
    /// Version must carry this tag.
    pub tag: Option<String>,
    /// Lineage restriction.
    #[serde(default)]
    pub branch: LineageFilter,
    /// Case-insensitive substring of the comment.
    pub search: Option<String>,
}

impl VersionFilter {
    /// Restrict to versions carrying `tag`.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Restrict to a lineage.
    pub fn with_branch(mut self, branch: LineageFilter) -> Self {
        self.branch = branch;
        self
    }

    /// Restrict to comments containing `text`.
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    /// Restrict to a creation window.
    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.created_from = from;
        self.created_to = to;
        self
    }

    /// Blank search text, normalized; `None` when there is nothing to match.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Evaluate the filter against a version in memory.
    pub fn matches(&self, version: &Version) -> bool {
        if self.created_from.is_some_and(|from| version.created_at < from) {
            return false;
        }
        if self.created_to.is_some_and(|to| version.created_at > to) {
            return false;
        }
        if let Some(tag) = self.tag.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !version.has_tag(tag) {
                return false;
            }
        }
        if !self.branch.matches(version.branch_name.as_deref()) {
            return false;
        }
        if let Some(term) = self.search_term() {
            let hit = version
                .comment
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&term));
            if !hit {
                return false;
            }
        }
        true
    }
}
