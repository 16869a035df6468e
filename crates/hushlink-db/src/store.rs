use hushlink_types::models::{Link, Message};
use uuid::Uuid;

use crate::StoreError;

/// Fields a caller supplies for a new message. Id, timestamp and the
/// anonymous flag are assigned by the store.
#[derive(Debug, Clone, Copy)]
pub struct NewMessage<'a> {
    pub link_id: Uuid,
    pub text: &'a str,
    pub is_safe: Option<bool>,
    pub moderation_reason: Option<&'a str>,
}

/// Primitive persistence operations behind the link and message stores.
///
/// Implementations must enforce `short_id` uniqueness atomically and report
/// a violation as [`StoreError::UniqueViolation`] with `column == "short_id"`.
pub trait Store: Send + Sync {
    fn insert_link(&self, short_id: &str, secret_key: &str) -> Result<Link, StoreError>;

    fn find_link_by_short_id(&self, short_id: &str) -> Result<Option<Link>, StoreError>;

    fn find_link_by_id(&self, id: Uuid) -> Result<Option<Link>, StoreError>;

    fn insert_message(&self, new: NewMessage<'_>) -> Result<Message, StoreError>;

    /// Newest first.
    fn list_messages(&self, link_id: Uuid) -> Result<Vec<Message>, StoreError>;

    /// Returns the number of rows removed (0 or 1).
    fn remove_message(&self, id: Uuid, link_id: Uuid) -> Result<usize, StoreError>;
}
