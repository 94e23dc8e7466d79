//! Diff engine configuration.

use serde::{Deserialize, Serialize};

/// Settings for structural and line-level comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Field names that hold long text and get a line-level diff.
    #[serde(default = "default_text_fields")]
    pub text_fields: Vec<String>,
    /// Maximum nesting depth of a snapshot before comparison is refused.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Maximum size in bytes of a single text value that is line-diffed.
    #[serde(default = "default_max_text_bytes")]
    pub max_text_bytes: usize,
}

impl DiffConfig {
    /// Whether `field` is designated as long text.
    pub fn is_text_field(&self, field: &str) -> bool {
        self.text_fields.iter().any(|f| f == field)
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            text_fields: default_text_fields(),
            max_depth: default_max_depth(),
            max_text_bytes: default_max_text_bytes(),
        }
    }
}

fn default_text_fields() -> Vec<String> {
    vec!["content".to_string(), "body".to_string()]
}

fn default_max_depth() -> usize {
    32
}

fn default_max_text_bytes() -> usize {
    1024 * 1024
}
