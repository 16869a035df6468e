//! Link creation and lookup.
//!
//! Short ids are decoupled from the internal primary key so URLs stay short
//! while foreign keys use the stable id. Collisions on the short id are
//! retried a bounded number of times.

use hushlink_crypto::{SHORT_ID_LENGTH, generate_secret_id, generate_short_id, secrets_match};
use hushlink_types::models::Link;
use tracing::{error, info, warn};

use crate::store::Store;
use crate::StoreError;

/// Upper bound on short-id generate + insert cycles per link.
pub const MAX_SHORT_ID_ATTEMPTS: u32 = 5;

/// Create a link with a fresh secret key and a random short id.
pub fn create_link<S: Store + ?Sized>(store: &S) -> Result<Link, StoreError> {
    create_link_with(store, || generate_short_id(SHORT_ID_LENGTH))
}

/// Like [`create_link`], drawing short ids from `next_short_id`.
///
/// Attempts are strictly sequential. Only a uniqueness violation on the
/// `short_id` column is retried; every other error aborts immediately.
pub fn create_link_with<S, F>(store: &S, mut next_short_id: F) -> Result<Link, StoreError>
where
    S: Store + ?Sized,
    F: FnMut() -> String,
{
    let secret_key = generate_secret_id();

    for attempt in 1..=MAX_SHORT_ID_ATTEMPTS {
        let short_id = next_short_id();
        match store.insert_link(&short_id, &secret_key) {
            Ok(link) => {
                info!("Created link {} (attempt {})", link.short_id, attempt);
                return Ok(link);
            }
            Err(StoreError::UniqueViolation { ref column }) if column == "short_id" => {
                warn!(
                    "Short id collision on attempt {}/{}, retrying",
                    attempt, MAX_SHORT_ID_ATTEMPTS
                );
            }
            Err(e) => {
                error!("Failed to create link: {}", e);
                return Err(e);
            }
        }
    }

    error!(
        "Gave up creating link after {} short id collisions",
        MAX_SHORT_ID_ATTEMPTS
    );
    Err(StoreError::ShortIdExhausted {
        attempts: MAX_SHORT_ID_ATTEMPTS,
    })
}

/// Look up a link by its public short id. A miss is `Ok(None)`.
pub fn get_link<S: Store + ?Sized>(store: &S, short_id: &str) -> Result<Option<Link>, StoreError> {
    store.find_link_by_short_id(short_id).inspect_err(|e| {
        error!("Failed to fetch link {}: {}", short_id, e);
    })
}

/// Resolve a link for its owner. Unknown link and wrong secret both yield
/// [`StoreError::Unauthorized`].
pub fn authorize<S: Store + ?Sized>(
    store: &S,
    short_id: &str,
    secret_key: &str,
) -> Result<Link, StoreError> {
    match get_link(store, short_id)? {
        Some(link) if secrets_match(&link.secret_key, secret_key) => Ok(link),
        _ => {
            warn!("Rejected owner access to link {}", short_id);
            Err(StoreError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::NewMessage;
    use hushlink_types::models::Message;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use uuid::Uuid;

    /// Wraps a store and reports a short-id collision for the first `collide` inserts.
    struct CollidingStore {
        inner: MemoryStore,
        collide: u32,
        calls: AtomicU32,
    }

    impl CollidingStore {
        fn new(collide: u32) -> Self {
            Self {
                inner: MemoryStore::new(),
                collide,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl Store for CollidingStore {
        fn insert_link(&self, short_id: &str, secret_key: &str) -> Result<Link, StoreError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.collide {
                return Err(StoreError::UniqueViolation {
                    column: "short_id".into(),
                });
            }
            self.inner.insert_link(short_id, secret_key)
        }
        fn find_link_by_short_id(&self, short_id: &str) -> Result<Option<Link>, StoreError> {
            self.inner.find_link_by_short_id(short_id)
        }
        fn find_link_by_id(&self, id: Uuid) -> Result<Option<Link>, StoreError> {
            self.inner.find_link_by_id(id)
        }
        fn insert_message(&self, new: NewMessage<'_>) -> Result<Message, StoreError> {
            self.inner.insert_message(new)
        }
        fn list_messages(&self, link_id: Uuid) -> Result<Vec<Message>, StoreError> {
            self.inner.list_messages(link_id)
        }
        fn remove_message(&self, id: Uuid, link_id: Uuid) -> Result<usize, StoreError> {
            self.inner.remove_message(id, link_id)
        }
    }

    /// Every insert fails with a non-retryable backend error.
    struct BrokenStore {
        calls: AtomicU32,
    }

    impl Store for BrokenStore {
        fn insert_link(&self, _: &str, _: &str) -> Result<Link, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Backend(anyhow::anyhow!("disk on fire")))
        }
        fn find_link_by_short_id(&self, _: &str) -> Result<Option<Link>, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("disk on fire")))
        }
        fn find_link_by_id(&self, _: Uuid) -> Result<Option<Link>, StoreError> {
            Ok(None)
        }
        fn insert_message(&self, new: NewMessage<'_>) -> Result<Message, StoreError> {
            Err(StoreError::LinkNotFound(new.link_id))
        }
        fn list_messages(&self, _: Uuid) -> Result<Vec<Message>, StoreError> {
            Ok(vec![])
        }
        fn remove_message(&self, _: Uuid, _: Uuid) -> Result<usize, StoreError> {
            Ok(0)
        }
    }

    #[test]
    fn creates_link_with_generated_tokens() {
        let store = MemoryStore::new();
        let link = create_link(&store).unwrap();

        assert_eq!(link.short_id.len(), SHORT_ID_LENGTH);
        assert!(link.short_id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(link.secret_key.parse::<Uuid>().is_ok());
        assert_eq!(get_link(&store, &link.short_id).unwrap(), Some(link));
    }

    #[test]
    fn retries_through_injected_collisions() {
        let store = CollidingStore::new(4);
        let link = create_link(&store).unwrap();

        assert_eq!(store.calls.load(Ordering::SeqCst), 5);
        assert!(get_link(&store, &link.short_id).unwrap().is_some());
    }

    #[test]
    fn exhaustion_after_five_collisions_leaves_nothing_behind() {
        let store = CollidingStore::new(u32::MAX);
        let err = create_link(&store).unwrap_err();

        assert!(matches!(err, StoreError::ShortIdExhausted { attempts: 5 }));
        assert!(err.to_string().contains("5 attempts"));
        assert_eq!(store.calls.load(Ordering::SeqCst), MAX_SHORT_ID_ATTEMPTS);
        assert_eq!(store.inner.link_count(), 0);
    }

    #[test]
    fn real_collisions_get_fresh_short_ids() {
        let store = MemoryStore::new();
        let taken = create_link_with(&store, || "TAKEN000".to_string()).unwrap();

        let mut candidates = vec!["FRESH000", "TAKEN000", "TAKEN000"];
        let link = create_link_with(&store, || candidates.pop().unwrap().to_string()).unwrap();

        assert_eq!(link.short_id, "FRESH000");
        assert_ne!(link.id, taken.id);
        assert_ne!(link.secret_key, taken.secret_key);
    }

    #[test]
    fn short_ids_stay_unique_across_many_links() {
        let store = MemoryStore::new();
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let link = create_link(&store).unwrap();
            assert!(seen.insert(link.short_id));
        }
    }

    #[test]
    fn backend_error_aborts_without_retry() {
        let store = BrokenStore {
            calls: AtomicU32::new(0),
        };
        let err = create_link(&store).unwrap_err();

        assert!(matches!(err, StoreError::Backend(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_short_id_is_not_found_not_error() {
        let store = MemoryStore::new();
        assert_eq!(get_link(&store, "nothere1").unwrap(), None);
    }

    #[test]
    fn lookup_failure_propagates() {
        let store = BrokenStore {
            calls: AtomicU32::new(0),
        };
        assert!(get_link(&store, "whatever").is_err());
    }

    #[test]
    fn authorize_checks_secret() {
        let store = MemoryStore::new();
        let link = create_link(&store).unwrap();

        let owned = authorize(&store, &link.short_id, &link.secret_key).unwrap();
        assert_eq!(owned.id, link.id);

        assert!(matches!(
            authorize(&store, &link.short_id, "wrong"),
            Err(StoreError::Unauthorized)
        ));
        assert!(matches!(
            authorize(&store, "nothere1", &link.secret_key),
            Err(StoreError::Unauthorized)
        ));
    }
}
