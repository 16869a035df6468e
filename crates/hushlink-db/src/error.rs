use rusqlite::ErrorCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A UNIQUE constraint rejected the insert.
    #[error("unique constraint violated on column `{column}`")]
    UniqueViolation { column: String },

    #[error("could not allocate a unique short id after {attempts} attempts")]
    ShortIdExhausted { attempts: u32 },

    /// Missing link or wrong secret key. Deliberately does not say which.
    #[error("authorization failed: invalid link or secret key")]
    Unauthorized,

    #[error("link {0} does not exist")]
    LinkNotFound(Uuid),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, Some(ref msg)) = err
            && failure.code == ErrorCode::ConstraintViolation
            && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            && let Some(column) = unique_column(msg)
        {
            return StoreError::UniqueViolation { column };
        }
        StoreError::Backend(err.into())
    }
}

/// Pull the column name out of SQLite's "UNIQUE constraint failed: table.column".
fn unique_column(msg: &str) -> Option<String> {
    let target = msg.strip_prefix("UNIQUE constraint failed: ")?;
    // Composite keys list several columns; the first one is enough to classify.
    let first = target.split(',').next()?.trim();
    let column = first.rsplit('.').next()?;
    Some(column.to_string())
}
