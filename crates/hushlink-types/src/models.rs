use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shareable inbox. Senders address it by `short_id`; the holder of
/// `secret_key` owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: Uuid,
    pub short_id: String,
    pub secret_key: String,
    pub created_at: DateTime<Utc>,
}

/// An anonymous message received on a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub link_id: Uuid,
    pub text: String,
    /// `None` when no verdict was recorded.
    pub is_safe: Option<bool>,
    pub moderation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_anonymous: bool,
}

/// Outcome of screening a message before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub is_safe: bool,
    pub reason: String,
}
