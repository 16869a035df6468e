use rusqlite::Connection;
use tracing::info;

use crate::StoreError;

pub fn run(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("Running migration v1 (links + messages)");
        conn.execute_batch(
            "
            CREATE TABLE links (
                id          TEXT PRIMARY KEY,
                short_id    TEXT NOT NULL UNIQUE,
                secret_key  TEXT NOT NULL,
                created_at  TEXT NOT NULL
            );

            CREATE TABLE messages (
                id                  TEXT PRIMARY KEY,
                link_id             TEXT NOT NULL REFERENCES links(id),
                text                TEXT NOT NULL,
                is_safe             INTEGER,
                moderation_reason   TEXT,
                created_at          TEXT NOT NULL,
                is_anonymous        INTEGER NOT NULL DEFAULT 1
            );

            CREATE INDEX idx_messages_link
                ON messages(link_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
