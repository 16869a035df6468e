use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Message;

// -- Links --

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLinkResponse {
    pub short_id: String,
    pub secret_key: String,
    /// Public URL senders open to write a message.
    pub send_url: String,
    /// Private URL the owner keeps to read messages.
    pub view_url: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a link; never carries the secret.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkInfoResponse {
    pub short_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub secret: Option<String>,
}

// -- Messages --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub text: String,
    pub is_safe: Option<bool>,
    pub moderation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_anonymous: bool,
}

impl From<Message> for MessageResponse {
    fn from(msg: Message) -> Self {
        Self {
            id: msg.id,
            text: msg.text,
            is_safe: msg.is_safe,
            moderation_reason: msg.moderation_reason,
            created_at: msg.created_at,
            is_anonymous: msg.is_anonymous,
        }
    }
}

/// Returned with 422 when moderation blocks a submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlockedResponse {
    pub reason: String,
}

// -- Summary --

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
