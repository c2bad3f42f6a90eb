use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cached result of a vendor login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginSession {
    pub username: String,
    /// Opaque vendor session material (cookies, tokens).
    pub session: Value,
    pub logged_in_at: DateTime<Utc>,
}

impl LoginSession {
    pub fn new(username: impl Into<String>, session: Value) -> Self {
        Self {
            username: username.into(),
            session,
            logged_in_at: Utc::now(),
        }
    }
}
