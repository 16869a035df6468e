//! Message persistence scoped to a link's internal id.

use hushlink_crypto::secrets_match;
use hushlink_types::models::Message;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::store::{NewMessage, Store};
use crate::StoreError;

/// Store an anonymous message carrying the verdict the caller computed.
pub fn add_message<S: Store + ?Sized>(
    store: &S,
    link_id: Uuid,
    text: &str,
    is_safe: Option<bool>,
    moderation_reason: Option<&str>,
) -> Result<Message, StoreError> {
    store
        .insert_message(NewMessage {
            link_id,
            text,
            is_safe,
            moderation_reason,
        })
        .inspect_err(|e| error!("Failed to add message to link {}: {}", link_id, e))
}

/// All messages for a link, newest first.
pub fn get_messages<S: Store + ?Sized>(
    store: &S,
    link_id: Uuid,
) -> Result<Vec<Message>, StoreError> {
    store
        .list_messages(link_id)
        .inspect_err(|e| error!("Failed to fetch messages for link {}: {}", link_id, e))
}

/// Delete one message after checking `secret_key` against the owning link.
///
/// Nothing is deleted unless the secret matches. Only a row matching both
/// `message_id` and `link_id` is removed; a missing row is not an error.
pub fn delete_message<S: Store + ?Sized>(
    store: &S,
    message_id: Uuid,
    link_id: Uuid,
    secret_key: &str,
) -> Result<bool, StoreError> {
    let link = store.find_link_by_id(link_id)?;
    let authorized = link.is_some_and(|l| secrets_match(&l.secret_key, secret_key));
    if !authorized {
        warn!("Rejected delete of message {} on link {}", message_id, link_id);
        return Err(StoreError::Unauthorized);
    }

    let removed = store
        .remove_message(message_id, link_id)
        .inspect_err(|e| error!("Failed to delete message {}: {}", message_id, e))?;
    if removed > 0 {
        info!("Deleted message {} from link {}", message_id, link_id);
    }
    Ok(true)
}
