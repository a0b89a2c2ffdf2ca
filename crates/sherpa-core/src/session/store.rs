//! Session-keyed conversation store.
//!
//! `SessionStore` maps session ids to their conversation state, backed by
//! `DashMap`. Each entry is an `Arc<tokio::sync::Mutex<_>>` so a turn can hold
//! its session for its whole duration while other sessions proceed. The
//! `Arc` is cloned out of the map immediately; a `DashMap` guard is never
//! held across `.await`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;

use sherpa_types::tour::SessionId;

use super::state::{ConversationState, SessionSnapshot};

/// Concurrent map of live conversations.
///
/// Cloning produces a shared view of the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<SessionId, Arc<Mutex<ConversationState>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the session's state, creating a fresh one if absent.
    pub fn get_or_create(&self, id: &SessionId) -> Arc<Mutex<ConversationState>> {
        if let Some(existing) = self.inner.get(id) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .inner
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(ConversationState::new())));
        Arc::clone(entry.value())
    }

    pub fn get(&self, id: &SessionId) -> Option<Arc<Mutex<ConversationState>>> {
        self.inner.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Snapshot of a session, waiting for any in-flight turn to finish.
    pub async fn snapshot(&self, id: &SessionId) -> Option<SessionSnapshot> {
        let handle = self.get(id)?;
        let state = handle.lock().await;
        Some(state.snapshot())
    }

    /// Remove a session. Returns whether it existed.
    pub fn remove(&self, id: &SessionId) -> bool {
        self.inner.remove(id).is_some()
    }

    /// Drop sessions idle for longer than `max_idle`. Returns how many were removed.
    ///
    /// A session whose handle is held outside the map (a turn that has
    /// fetched it, locked or not) is always kept.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let max_idle = chrono::Duration::from_std(max_idle).unwrap_or(chrono::Duration::MAX);
        let now = Utc::now();
        let before = self.inner.len();
        self.inner.retain(|_, handle| {
            if Arc::strong_count(handle) > 1 {
                return true;
            }
            match handle.try_lock() {
                Ok(state) => now - state.last_active_at <= max_idle,
                Err(_) => true,
            }
        });
        let evicted = before.saturating_sub(self.inner.len());
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.inner.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_or_create_returns_same_handle() {
        let store = SessionStore::new();
        let id = SessionId::from("alpha");
        let a = store.get_or_create(&id);
        let b = store.get_or_create(&id);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = SessionStore::new();
        let a = store.get_or_create(&SessionId::from("a"));
        let b = store.get_or_create(&SessionId::from("b"));
        a.lock().await.language = "Spanish".to_string();
        assert_eq!(b.lock().await.language, "English");
    }

    #[tokio::test]
    async fn test_snapshot_and_remove() {
        let store = SessionStore::new();
        let id = SessionId::from("s1");
        assert!(store.snapshot(&id).await.is_none());

        store.get_or_create(&id).lock().await.last_city = "Paris".to_string();
        let snapshot = store.snapshot(&id).await.unwrap();
        assert_eq!(snapshot.last_city, "Paris");

        assert!(store.remove(&id));
        assert!(!store.remove(&id));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_evict_idle_drops_only_stale_sessions() {
        let store = SessionStore::new();
        store
            .get_or_create(&SessionId::from("stale"))
            .lock()
            .await
            .last_active_at = Utc::now() - chrono::Duration::hours(2);
        store.get_or_create(&SessionId::from("fresh"));

        let evicted = store.evict_idle(Duration::from_secs(3600));
        assert_eq!(evicted, 1);
        assert!(store.get(&SessionId::from("stale")).is_none());
        assert!(store.get(&SessionId::from("fresh")).is_some());
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_busy_sessions() {
        let store = SessionStore::new();
        let busy = store.get_or_create(&SessionId::from("busy"));
        let mut guard = busy.lock().await;
        guard.last_active_at = Utc::now() - chrono::Duration::hours(5);

        assert_eq!(store.evict_idle(Duration::from_secs(60)), 0);
        drop(guard);
        drop(busy);
        assert_eq!(store.evict_idle(Duration::from_secs(60)), 1);
    }

    #[tokio::test]
    async fn test_evict_idle_keeps_fetched_but_unlocked_sessions() {
        let store = SessionStore::new();
        let id = SessionId::from("pending");
        store.get_or_create(&id).lock().await.last_active_at =
            Utc::now() - chrono::Duration::hours(3);

        let pending = store.get_or_create(&id);
        assert_eq!(store.evict_idle(Duration::from_secs(60)), 0);

        pending.lock().await.last_city = "Rome".to_string();
        assert_eq!(store.snapshot(&id).await.unwrap().last_city, "Rome");

        drop(pending);
        assert_eq!(store.evict_idle(Duration::from_secs(60)), 1);
    }
}
