use chrono::{SubsecRound, Utc};
use hushlink_types::models::{Link, Message};
use rusqlite::{Connection, OptionalExtension};
use uuid::Uuid;

use crate::models::{LinkRow, MessageRow, format_timestamp};
use crate::store::{NewMessage, Store};
use crate::{Database, StoreError};

impl Store for Database {
    // -- Links --

    fn insert_link(&self, short_id: &str, secret_key: &str) -> Result<Link, StoreError> {
        let link = Link {
            id: Uuid::new_v4(),
            short_id: short_id.to_string(),
            secret_key: secret_key.to_string(),
            // Stored with microsecond precision.
            created_at: Utc::now().trunc_subsecs(6),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO links (id, short_id, secret_key, created_at) VALUES (?1, ?2, ?3, ?4)",
                (
                    link.id.to_string(),
                    &link.short_id,
                    &link.secret_key,
                    format_timestamp(link.created_at),
                ),
            )?;
            Ok(())
        })?;

        Ok(link)
    }

    fn find_link_by_short_id(&self, short_id: &str) -> Result<Option<Link>, StoreError> {
        self.with_conn(|conn| query_link(conn, "short_id", short_id))
    }

    fn find_link_by_id(&self, id: Uuid) -> Result<Option<Link>, StoreError> {
        self.with_conn(|conn| query_link(conn, "id", &id.to_string()))
    }

    // -- Messages --

    fn insert_message(&self, new: NewMessage<'_>) -> Result<Message, StoreError> {
        let msg = Message {
            id: Uuid::new_v4(),
            link_id: new.link_id,
            text: new.text.to_string(),
            is_safe: new.is_safe,
            moderation_reason: new.moderation_reason.map(str::to_string),
            created_at: Utc::now().trunc_subsecs(6),
            is_anonymous: true,
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages
                     (id, link_id, text, is_safe, moderation_reason, created_at, is_anonymous)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)",
                rusqlite::params![
                    msg.id.to_string(),
                    msg.link_id.to_string(),
                    msg.text,
                    msg.is_safe,
                    msg.moderation_reason,
                    format_timestamp(msg.created_at),
                ],
            )
            .map_err(|e| {
                let missing_link = e.sqlite_error().is_some_and(|f| {
                    f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
                });
                if missing_link {
                    StoreError::LinkNotFound(msg.link_id)
                } else {
                    StoreError::from(e)
                }
            })?;
            Ok(())
        })?;

        Ok(msg)
    }

    fn list_messages(&self, link_id: Uuid) -> Result<Vec<Message>, StoreError> {
        self.with_conn(|conn| query_messages(conn, &link_id.to_string()))
    }

    fn remove_message(&self, id: Uuid, link_id: Uuid) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let removed = conn.execute(
                "DELETE FROM messages WHERE id = ?1 AND link_id = ?2",
                (id.to_string(), link_id.to_string()),
            )?;
            Ok(removed)
        })
    }
}

fn query_link(conn: &Connection, column: &str, value: &str) -> Result<Option<Link>, StoreError> {
    // `column` is always one of our own literals, never user input.
    let sql = format!(
        "SELECT id, short_id, secret_key, created_at FROM links WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(LinkRow {
                id: row.get(0)?,
                short_id: row.get(1)?,
                secret_key: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    row.map(Link::try_from).transpose()
}

fn query_messages(conn: &Connection, link_id: &str) -> Result<Vec<Message>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, link_id, text, is_safe, moderation_reason, created_at, is_anonymous
         FROM messages
         WHERE link_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt
        .query_map([link_id], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                link_id: row.get(1)?,
                text: row.get(2)?,
                is_safe: row.get(3)?,
                moderation_reason: row.get(4)?,
                created_at: row.get(5)?,
                is_anonymous: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(Message::try_from).collect()
}
