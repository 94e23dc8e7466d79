//! Identity of a versioned content item.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Maximum length of either half of a content key.
const MAX_PART_LEN: usize = 100;

/// The `(content_type, content_id)` pair that owns a version history.
///
/// `content_type` is the schema tag of the owning entity (`"article"`,
/// `"media-file"`); `content_id` is that entity's identifier. Rendered
/// as `type/id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentKey {
    /// Schema tag of the owning entity.
    pub content_type: String,
    /// Identifier of the owning entity.
    pub content_id: String,
}

impl ContentKey {
    /// Build a key, rejecting empty or oversized parts.
    pub fn new(content_type: impl Into<String>, content_id: impl Into<String>) -> Result<Self, AppError> {
        let content_type = content_type.into().trim().to_string();
        let content_id = content_id.into().trim().to_string();

        if content_type.is_empty() || content_id.is_empty() {
            return Err(AppError::validation(
                "content_type and content_id must not be empty",
            ));
        }
        if content_type.len() > MAX_PART_LEN || content_id.len() > MAX_PART_LEN {
            return Err(AppError::validation(format!(
                "content_type and content_id are limited to {MAX_PART_LEN} characters"
            )));
        }
        if content_type.contains('/') {
            return Err(AppError::validation(format!(
                "content_type '{content_type}' must not contain '/'"
            )));
        }

        Ok(Self {
            content_type,
            content_id,
        })
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.content_type, self.content_id)
    }
}

impl FromStr for ContentKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (content_type, content_id) = s.split_once('/').ok_or_else(|| {
            AppError::validation(format!("Content key '{s}' must look like 'type/id'"))
        })?;
        Self::new(content_type, content_id)
    }
}
