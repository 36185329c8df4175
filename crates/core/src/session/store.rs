//! Session store - the single authoritative holder of the current session
//!
//! Memory is the source of truth once loaded; durable storage only exists to
//! survive process restarts. All mutations are serialized through one writer
//! lock that spans the durable write, so readers never observe a session that
//! failed to persist.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use pawsit_domain::constants::{LOGGED_OUT_STORAGE_KEY, SESSION_STORAGE_KEY};
use pawsit_domain::{PawsitError, Result, Session, StoredSession};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::ports::{KeyValueStore, TokenRefresher};

/// In-memory view of the session
#[derive(Debug, Clone, Default)]
enum Slot {
    /// Not read from durable storage yet
    #[default]
    Unloaded,
    Active(Session),
    /// Logged out; durable storage is not consulted until the next sign-in
    Cleared,
}

impl Slot {
    fn session(&self) -> Option<Session> {
        match self {
            Self::Active(session) => Some(session.clone()),
            Self::Unloaded | Self::Cleared => None,
        }
    }
}

/// Session store with single-writer update semantics
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    memory: RwLock<Slot>,
    writer: Mutex<()>,
    refresher: RwLock<Option<Weak<dyn TokenRefresher>>>,
}

impl SessionStore {
    /// Create a store backed by `storage`
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            memory: RwLock::new(Slot::Unloaded),
            writer: Mutex::new(()),
            refresher: RwLock::new(None),
        }
    }

    /// Attach the token refresher used when a session has no token
    ///
    /// Held weakly: the refresher itself owns this store.
    pub fn attach_refresher(&self, refresher: Weak<dyn TokenRefresher>) {
        *self.refresher.write() = Some(refresher);
    }

    /// Current session, refreshing its token first if it has none
    ///
    /// Refresh failures are logged and the tokenless session is returned;
    /// the request path will surface the authentication error if it matters.
    ///
    /// # Errors
    /// Returns an error only if durable storage cannot be read.
    pub async fn get(&self) -> Result<Option<Session>> {
        let Some(session) = self.snapshot().await? else {
            return Ok(None);
        };

        if session.has_token() {
            return Ok(Some(session));
        }

        let refresher = self.refresher.read().as_ref().and_then(Weak::upgrade);
        if let Some(refresher) = refresher {
            debug!(user_id = %session.id, "Session has no token, refreshing before use");
            if let Err(err) = refresher.refresh().await {
                warn!(user_id = %session.id, error = %err, "Token refresh on session read failed");
            }
        }

        Ok(self.memory.read().session())
    }

    /// Current session without any refresh side effect
    ///
    /// # Errors
    /// Returns an error if durable storage cannot be read.
    pub async fn snapshot(&self) -> Result<Option<Session>> {
        match &*self.memory.read() {
            Slot::Active(session) => return Ok(Some(session.clone())),
            Slot::Cleared => return Ok(None),
            Slot::Unloaded => {}
        }

        let _guard = self.writer.lock().await;
        self.load_locked().await
    }

    /// Persist `session` and make it the in-memory session
    ///
    /// # Errors
    /// Returns an error if the durable write fails; memory is left unchanged.
    pub async fn save(&self, session: Session) -> Result<()> {
        let _guard = self.writer.lock().await;
        self.persist_locked(session).await
    }

    /// Start a session after login: save it and clear the logged-out flag
    ///
    /// # Errors
    /// Returns an error if either durable write fails.
    pub async fn sign_in(&self, session: Session) -> Result<()> {
        let _guard = self.writer.lock().await;
        info!(user_id = %session.id, "Signing in");
        self.persist_locked(session).await?;
        self.storage.remove(LOGGED_OUT_STORAGE_KEY).await
    }

    /// Read-modify-write the current session
    ///
    /// Returns `None` without writing when there is no session, so a late
    /// token refresh cannot resurrect a session that was logged out.
    ///
    /// # Errors
    /// Returns an error if durable storage fails.
    pub async fn update<F>(&self, apply: F) -> Result<Option<Session>>
    where
        F: FnOnce(&mut Session) + Send,
    {
        let _guard = self.writer.lock().await;
        let Some(mut session) = self.load_locked().await? else {
            return Ok(None);
        };

        apply(&mut session);
        self.persist_locked(session.clone()).await?;
        Ok(Some(session))
    }

    /// Log out: drop the session everywhere and set the logged-out flag
    ///
    /// Memory is cleared even if storage fails, and a stale durable record
    /// is not read back until the next sign-in.
    ///
    /// # Errors
    /// Returns the first durable storage error.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.writer.lock().await;
        let previous = std::mem::replace(&mut *self.memory.write(), Slot::Cleared).session();
        info!(user_id = previous.as_ref().map(|s| s.id.as_str()), "Clearing session");

        let removed = self.storage.remove(SESSION_STORAGE_KEY).await;
        let flagged = self.storage.set(LOGGED_OUT_STORAGE_KEY, "true").await;
        removed.and(flagged)
    }

    /// Whether the user explicitly logged out (durable flag)
    ///
    /// # Errors
    /// Returns an error if durable storage cannot be read.
    pub async fn is_logged_out(&self) -> Result<bool> {
        let flag = self.storage.get(LOGGED_OUT_STORAGE_KEY).await?;
        Ok(flag.is_some_and(|v| v.trim().eq_ignore_ascii_case("true")))
    }

    async fn load_locked(&self) -> Result<Option<Session>> {
        match &*self.memory.read() {
            Slot::Active(session) => return Ok(Some(session.clone())),
            Slot::Cleared => return Ok(None),
            Slot::Unloaded => {}
        }

        let Some(raw) = self.storage.get(SESSION_STORAGE_KEY).await? else {
            return Ok(None);
        };

        let session = match decode_session(&raw) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "Discarding unreadable session record");
                return Ok(None);
            }
        };

        debug!(user_id = %session.id, "Restored session from durable storage");
        *self.memory.write() = Slot::Active(session.clone());
        Ok(Some(session))
    }

    async fn persist_locked(&self, session: Session) -> Result<()> {
        let record = serde_json::to_string(&StoredSession::now(session.clone()))?;
        self.storage.set(SESSION_STORAGE_KEY, &record).await?;
        *self.memory.write() = Slot::Active(session);
        Ok(())
    }
}

/// Accepts the current envelope and bare session records
fn decode_session(raw: &str) -> Result<Session> {
    if let Ok(stored) = serde_json::from_str::<StoredSession>(raw) {
        return Ok(stored.session);
    }
    serde_json::from_str::<Session>(raw)
        .map_err(|e| PawsitError::Serialization(format!("invalid session record: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use pawsit_domain::SessionStatus;

    use super::*;

    #[derive(Default)]
    struct MapStore {
        values: parking_lot::Mutex<HashMap<String, String>>,
        fail_writes: bool,
        fail_removes: bool,
    }

    #[async_trait]
    impl KeyValueStore for MapStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes {
                return Err(PawsitError::Storage("disk full".into()));
            }
            self.values.lock().insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<()> {
            if self.fail_removes {
                return Err(PawsitError::Storage("locked".into()));
            }
            self.values.lock().remove(key);
            Ok(())
        }
    }

    struct StaticRefresher {
        store: Weak<SessionStore>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenRefresher for StaticRefresher {
        async fn refresh(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let store = self.store.upgrade().ok_or(PawsitError::NotAuthenticated)?;
            store.update(|s| s.token = Some("fresh".into())).await?;
            Ok("fresh".into())
        }
    }

    #[tokio::test]
    async fn save_then_get_returns_memory_session() {
        let storage = Arc::new(MapStore::default());
        let store = SessionStore::new(storage.clone());

        store.save(Session::new("u-1").with_token("t-1")).await.unwrap();

        let session = store.get().await.unwrap().unwrap();
        assert_eq!(session.token.as_deref(), Some("t-1"));
        assert!(storage.values.lock().contains_key(SESSION_STORAGE_KEY));
    }

    #[tokio::test]
    async fn restores_from_durable_storage_after_restart() {
        let storage = Arc::new(MapStore::default());
        SessionStore::new(storage.clone())
            .save(Session::new("u-7").with_token("persisted"))
            .await
            .unwrap();

        let restarted = SessionStore::new(storage);
        let session = restarted.get().await.unwrap().unwrap();
        assert_eq!(session.id, "u-7");
        assert_eq!(session.token.as_deref(), Some("persisted"));
    }

    #[tokio::test]
    async fn accepts_bare_session_records() {
        let storage = Arc::new(MapStore::default());
        storage
            .values
            .lock()
            .insert(SESSION_STORAGE_KEY.into(), r#"{"_id":"legacy","token":"x"}"#.into());

        let store = SessionStore::new(storage);
        assert_eq!(store.snapshot().await.unwrap().unwrap().id, "legacy");
    }

    #[tokio::test]
    async fn corrupt_record_is_treated_as_absent() {
        let storage = Arc::new(MapStore::default());
        storage.values.lock().insert(SESSION_STORAGE_KEY.into(), "{not json".into());

        let store = SessionStore::new(storage);
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let storage = Arc::new(MapStore { fail_writes: true, ..Default::default() });
        let store = SessionStore::new(storage);

        let result = store.save(Session::new("u-1")).await;
        assert!(matches!(result, Err(PawsitError::Storage(_))));
        assert!(store.snapshot().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_refreshes_tokenless_session() {
        let store = Arc::new(SessionStore::new(Arc::new(MapStore::default())));
        store.save(Session::new("u-1")).await.unwrap();

        let refresher =
            Arc::new(StaticRefresher { store: Arc::downgrade(&store), calls: AtomicUsize::new(0) });
        let as_port: Arc<dyn TokenRefresher> = refresher.clone();
        store.attach_refresher(Arc::downgrade(&as_port));

        let session = store.get().await.unwrap().unwrap();
        assert_eq!(session.token.as_deref(), Some("fresh"));
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);

        // Token present now, no further refresh
        store.get().await.unwrap();
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn update_without_session_is_noop() {
        let storage = Arc::new(MapStore::default());
        let store = SessionStore::new(storage.clone());

        let updated = store.update(|s| s.token = Some("late".into())).await.unwrap();
        assert!(updated.is_none());
        assert!(storage.values.lock().is_empty());
    }

    #[tokio::test]
    async fn update_persists_changes() {
        let storage = Arc::new(MapStore::default());
        let store = SessionStore::new(storage.clone());
        store.save(Session::new("u-1")).await.unwrap();

        store.update(|s| s.status = SessionStatus::Pending).await.unwrap();

        let restarted = SessionStore::new(storage);
        assert_eq!(restarted.snapshot().await.unwrap().unwrap().status, SessionStatus::Pending);
    }

    #[tokio::test]
    async fn clear_sets_logged_out_and_sign_in_resets_it() {
        let storage = Arc::new(MapStore::default());
        let store = SessionStore::new(storage.clone());
        store.sign_in(Session::new("u-1").with_token("t")).await.unwrap();
        assert!(!store.is_logged_out().await.unwrap());

        store.clear().await.unwrap();
        assert!(store.is_logged_out().await.unwrap());
        assert!(store.get().await.unwrap().is_none());
        assert!(!storage.values.lock().contains_key(SESSION_STORAGE_KEY));

        store.sign_in(Session::new("u-2").with_token("t2")).await.unwrap();
        assert!(!store.is_logged_out().await.unwrap());
    }

    #[tokio::test]
    async fn failed_removal_does_not_bring_the_session_back() {
        let storage = Arc::new(MapStore { fail_removes: true, ..Default::default() });
        let store = SessionStore::new(storage.clone());
        store.save(Session::new("u-1").with_token("t")).await.unwrap();

        let result = store.clear().await;
        assert!(matches!(result, Err(PawsitError::Storage(_))));
        assert!(storage.values.lock().contains_key(SESSION_STORAGE_KEY));

        assert!(store.is_logged_out().await.unwrap());
        assert!(store.snapshot().await.unwrap().is_none());
        assert!(store.get().await.unwrap().is_none());
        assert!(store.update(|s| s.token = Some("late".into())).await.unwrap().is_none());

        store.save(Session::new("u-2").with_token("t2")).await.unwrap();
        assert_eq!(store.snapshot().await.unwrap().unwrap().id, "u-2");
    }
}
