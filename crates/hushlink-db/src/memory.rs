use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use hushlink_types::models::{Link, Message};
use uuid::Uuid;

use crate::store::{NewMessage, Store};
use crate::StoreError;

/// In-process [`Store`] with the same constraints as the SQLite schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    links: HashMap<Uuid, Link>,
    short_ids: HashMap<String, Uuid>,
    /// Insertion order; ties on `created_at` resolve newest-inserted first.
    messages: Vec<Message>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn link_count(&self) -> usize {
        self.tables().map(|t| t.links.len()).unwrap_or(0)
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|e| StoreError::Backend(anyhow::anyhow!("memory store lock poisoned: {}", e)))
    }
}

impl Store for MemoryStore {
    fn insert_link(&self, short_id: &str, secret_key: &str) -> Result<Link, StoreError> {
        let mut tables = self.tables()?;
        if tables.short_ids.contains_key(short_id) {
            return Err(StoreError::UniqueViolation {
                column: "short_id".to_string(),
            });
        }

        let link = Link {
            id: Uuid::new_v4(),
            short_id: short_id.to_string(),
            secret_key: secret_key.to_string(),
            created_at: Utc::now(),
        };
        tables.short_ids.insert(link.short_id.clone(), link.id);
        tables.links.insert(link.id, link.clone());
        Ok(link)
    }

    fn find_link_by_short_id(&self, short_id: &str) -> Result<Option<Link>, StoreError> {
        let tables = self.tables()?;
        Ok(tables
            .short_ids
            .get(short_id)
            .and_then(|id| tables.links.get(id))
            .cloned())
    }

    fn find_link_by_id(&self, id: Uuid) -> Result<Option<Link>, StoreError> {
        Ok(self.tables()?.links.get(&id).cloned())
    }

    fn insert_message(&self, new: NewMessage<'_>) -> Result<Message, StoreError> {
        let mut tables = self.tables()?;
        if !tables.links.contains_key(&new.link_id) {
            return Err(StoreError::LinkNotFound(new.link_id));
        }

        let msg = Message {
            id: Uuid::new_v4(),
            link_id: new.link_id,
            text: new.text.to_string(),
            is_safe: new.is_safe,
            moderation_reason: new.moderation_reason.map(str::to_string),
            created_at: Utc::now(),
            is_anonymous: true,
        };
        tables.messages.push(msg.clone());
        Ok(msg)
    }

    fn list_messages(&self, link_id: Uuid) -> Result<Vec<Message>, StoreError> {
        let tables = self.tables()?;
        let mut out: Vec<Message> = tables
            .messages
            .iter()
            .rev()
            .filter(|m| m.link_id == link_id)
            .cloned()
            .collect();
        // Stable sort keeps reverse insertion order for equal timestamps.
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    fn remove_message(&self, id: Uuid, link_id: Uuid) -> Result<usize, StoreError> {
        let mut tables = self.tables()?;
        let before = tables.messages.len();
        tables
            .messages
            .retain(|m| !(m.id == id && m.link_id == link_id));
        Ok(before - tables.messages.len())
    }
}
