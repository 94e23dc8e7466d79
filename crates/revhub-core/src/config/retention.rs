//! Version retention configuration.

use serde::{Deserialize, Serialize};

/// Defaults applied by the retention service when the caller gives none.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Age in days after which versions become eligible for purging.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    /// Number of newest versions `keep_latest` retains per content item.
    #[serde(default = "default_keep_latest")]
    pub keep_latest: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_age_days: default_max_age_days(),
            keep_latest: default_keep_latest(),
        }
    }
}

fn default_max_age_days() -> u32 {
    90
}

fn default_keep_latest() -> u32 {
    10
}
