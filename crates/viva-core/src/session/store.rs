//! SessionStore - the single source of truth for who is signed in.

use std::sync::{Arc, Mutex};

use super::state::{Session, UserProfile};
use crate::storage::{KeyValueStore, StorageError, LOGGED_IN_KEY, TOKEN_KEY, USER_KEY};

#[derive(Debug, Default)]
struct SessionState {
    user: Option<UserProfile>,
    is_logged_in: bool,
}

/// Holds the signed-in user and login flag, mirrored into durable storage.
///
/// Every mutation updates memory first and then writes the matching key
/// through to storage. The two keys are written independently, so a crash
/// between writes can leave them disagreeing.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: Mutex<SessionState>,
}

impl SessionStore {
    /// Create an empty, logged-out store. Call [`initialize_store`] to
    /// rehydrate from storage.
    ///
    /// [`initialize_store`]: SessionStore::initialize_store
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the user profile and persist its JSON form.
    pub fn set_user(&self, user: UserProfile) -> Result<(), StorageError> {
        let serialized = serde_json::to_string(&user)?;
        self.state().user = Some(user).filter(|u| !u.is_null());
        self.storage.set(USER_KEY, &serialized)
    }

    /// Set the login flag and persist it as `"true"` / `"false"`.
    pub fn set_logged_in(&self, status: bool) -> Result<(), StorageError> {
        self.state().is_logged_in = status;
        self.storage.set(LOGGED_IN_KEY, if status { "true" } else { "false" })
    }

    /// Load user and login flag from storage.
    ///
    /// A stored user that fails to parse is treated as absent: it is logged,
    /// removed from storage and the in-memory user is left empty. Storage
    /// read failures propagate.
    pub fn initialize_store(&self) -> Result<(), StorageError> {
        let saved_user = self.storage.get(USER_KEY)?;
        let saved_login_status = self.storage.get(LOGGED_IN_KEY)?;

        if let Some(raw) = saved_user.filter(|s| !s.is_empty()) {
            match serde_json::from_str::<UserProfile>(&raw) {
                Ok(user) => {
                    self.state().user = Some(user).filter(|u| !u.is_null());
                }
                Err(e) => {
                    log::warn!("Discarding unreadable persisted user: {}", e);
                    self.storage.remove(USER_KEY)?;
                }
            }
        }

        if let Some(status) = saved_login_status.filter(|s| !s.is_empty()) {
            self.state().is_logged_in = status == "true";
        }

        Ok(())
    }

    /// Clear user and login flag, in memory and in storage.
    ///
    /// Both keys are always attempted; the first storage error is returned.
    /// The token key is left alone; see `HttpClient` recovery and
    /// `VivaContext::sign_out` for flows that also drop the token.
    pub fn logout(&self) -> Result<(), StorageError> {
        {
            let mut state = self.state();
            state.user = None;
            state.is_logged_in = false;
        }
        let user = self.storage.remove(USER_KEY);
        let flag = self.storage.remove(LOGGED_IN_KEY);
        user.and(flag)
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.state().user.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.state().is_logged_in
    }

    /// Snapshot of the session, reading the token from storage.
    pub fn session(&self) -> Result<Session, StorageError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let state = self.state();
        Ok(Session {
            token,
            user: state.user.clone(),
            is_logged_in: state.is_logged_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use serde_json::json;
    use tempfile::tempdir;

    /// Memory store whose `remove` fails for one key.
    struct StuckKeyStore {
        inner: MemoryStore,
        stuck: &'static str,
    }

    impl KeyValueStore for StuckKeyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            if key == self.stuck {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone").into());
            }
            self.inner.remove(key)
        }
    }

    fn memory_store() -> (Arc<MemoryStore>, SessionStore) {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::new(storage.clone());
        (storage, store)
    }

    #[test]
    fn starts_logged_out() {
        let (_, store) = memory_store();
        assert!(!store.is_logged_in());
        assert!(store.user().is_none());
    }

    #[test]
    fn set_user_writes_json() {
        let (storage, store) = memory_store();
        store.set_user(json!({"id": 1, "name": "Ada"})).unwrap();

        assert_eq!(store.user(), Some(json!({"id": 1, "name": "Ada"})));
        let raw = storage.get(USER_KEY).unwrap().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, json!({"id": 1, "name": "Ada"}));
    }

    #[test]
    fn set_logged_in_writes_string_form() {
        let (storage, store) = memory_store();

        store.set_logged_in(true).unwrap();
        assert!(store.is_logged_in());
        assert_eq!(storage.get(LOGGED_IN_KEY).unwrap(), Some("true".to_string()));

        store.set_logged_in(false).unwrap();
        assert!(!store.is_logged_in());
        assert_eq!(storage.get(LOGGED_IN_KEY).unwrap(), Some("false".to_string()));
    }

    #[test]
    fn user_survives_restart() {
        let dir = tempdir().unwrap();
        {
            let storage = Arc::new(FileStore::open(dir.path()).unwrap());
            let store = SessionStore::new(storage);
            store.set_user(json!({"id": 1})).unwrap();
            store.set_logged_in(true).unwrap();
        }

        let storage = Arc::new(FileStore::open(dir.path()).unwrap());
        let store = SessionStore::new(storage);
        store.initialize_store().unwrap();

        assert_eq!(store.user(), Some(json!({"id": 1})));
        assert!(store.is_logged_in());
    }

    #[test]
    fn logout_then_initialize_is_logged_out() {
        let (storage, store) = memory_store();
        store.set_user(json!({"id": 1})).unwrap();
        store.set_logged_in(true).unwrap();

        store.logout().unwrap();
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_eq!(storage.get(LOGGED_IN_KEY).unwrap(), None);

        let fresh = SessionStore::new(storage);
        fresh.initialize_store().unwrap();
        assert!(!fresh.is_logged_in());
        assert!(fresh.user().is_none());
    }

    #[test]
    fn logout_clears_login_flag_even_when_user_removal_fails() {
        let storage = Arc::new(StuckKeyStore {
            inner: MemoryStore::new(),
            stuck: USER_KEY,
        });
        let store = SessionStore::new(storage.clone());
        store.set_user(json!({"id": 1})).unwrap();
        store.set_logged_in(true).unwrap();

        let err = store.logout().unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(!store.is_logged_in());
        assert!(store.user().is_none());
        assert_eq!(storage.get(LOGGED_IN_KEY).unwrap(), None);

        let restarted = SessionStore::new(storage);
        restarted.initialize_store().unwrap();
        assert!(!restarted.is_logged_in());
    }

    #[test]
    fn logout_keeps_token() {
        let (storage, store) = memory_store();
        storage.set(TOKEN_KEY, "abc").unwrap();
        store.logout().unwrap();
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), Some("abc".to_string()));
    }

    #[test]
    fn only_exact_true_means_logged_in() {
        let (storage, store) = memory_store();
        storage.set(LOGGED_IN_KEY, "TRUE").unwrap();
        store.initialize_store().unwrap();
        assert!(!store.is_logged_in());

        storage.set(LOGGED_IN_KEY, "true").unwrap();
        store.initialize_store().unwrap();
        assert!(store.is_logged_in());
    }

    #[test]
    fn empty_login_string_leaves_flag_untouched() {
        let (storage, store) = memory_store();
        store.set_logged_in(true).unwrap();
        storage.set(LOGGED_IN_KEY, "").unwrap();

        store.initialize_store().unwrap();
        assert!(store.is_logged_in());
    }

    #[test]
    fn corrupted_user_is_treated_as_absent() {
        let (storage, store) = memory_store();
        storage.set(USER_KEY, "{broken").unwrap();
        storage.set(LOGGED_IN_KEY, "true").unwrap();

        store.initialize_store().unwrap();

        assert!(store.user().is_none());
        assert!(store.is_logged_in());
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
    }

    #[test]
    fn stored_null_user_is_no_user() {
        let (storage, store) = memory_store();
        store.set_user(serde_json::Value::Null).unwrap();
        assert!(store.user().is_none());
        assert_eq!(storage.get(USER_KEY).unwrap(), Some("null".to_string()));

        store.initialize_store().unwrap();
        assert!(store.user().is_none());
    }

    #[test]
    fn session_snapshot_reads_token_from_storage() {
        let (storage, store) = memory_store();
        storage.set(TOKEN_KEY, "abc").unwrap();
        store.set_logged_in(true).unwrap();

        let session = store.session().unwrap();
        assert_eq!(session.token.as_deref(), Some("abc"));
        assert!(session.is_logged_in);
        assert!(session.user.is_none());
    }
}
