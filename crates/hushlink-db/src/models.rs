//! Database row types. These map directly to SQLite rows and are converted
//! into hushlink-types models at the store boundary.

use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use hushlink_types::models::{Link, Message};
use uuid::Uuid;

use crate::StoreError;

pub struct LinkRow {
    pub id: String,
    pub short_id: String,
    pub secret_key: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub link_id: String,
    pub text: String,
    pub is_safe: Option<bool>,
    pub moderation_reason: Option<String>,
    pub created_at: String,
    pub is_anonymous: bool,
}

impl TryFrom<LinkRow> for Link {
    type Error = StoreError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        Ok(Link {
            id: parse_id(&row.id)?,
            short_id: row.short_id,
            secret_key: row.secret_key,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: parse_id(&row.id)?,
            link_id: parse_id(&row.link_id)?,
            text: row.text,
            is_safe: row.is_safe,
            moderation_reason: row.moderation_reason,
            created_at: parse_timestamp(&row.created_at)?,
            is_anonymous: row.is_anonymous,
        })
    }
}

/// Fixed-width RFC 3339 so that lexical order in SQLite matches time order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_id(raw: &str) -> Result<Uuid, StoreError> {
    raw.parse::<Uuid>()
        .with_context(|| format!("corrupt id '{}'", raw))
        .map_err(StoreError::Backend)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by hand through sqlite3 use datetime('now'), which has no zone.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .map_err(|e| StoreError::Backend(anyhow!("corrupt timestamp '{}': {}", raw, e)))
}
