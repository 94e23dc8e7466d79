//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use revhub_core::types::UserId;

/// Who is acting, passed into mutating service methods.
///
/// Authentication happens upstream; a `None` user marks system work such
/// as scheduled retention or CLI maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user.
    pub user_id: Option<UserId>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for an authenticated user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            request_time: Utc::now(),
        }
    }

    /// Context for work without a human author.
    pub fn system() -> Self {
        Self {
            user_id: None,
            request_time: Utc::now(),
        }
    }

    /// Whether the request acts on behalf of a user.
    pub fn is_user(&self) -> bool {
        self.user_id.is_some()
    }
}
