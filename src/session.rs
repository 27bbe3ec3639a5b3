use crate::errors::StorageError;
use crate::models::{Session, User};
use crate::storage::SessionStorage;
use std::sync::Arc;
use tracing::{info, warn};

const SESSION_KEY: &str = "session";

/// Owns the persisted session. Token and user are written as one value so a
/// reader sees either both or neither.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    pub fn session(&self) -> Option<Session> {
        let raw = self.storage.get(SESSION_KEY)?;
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if !session.token.is_empty() => Some(session),
            Ok(_) => None,
            Err(err) => {
                warn!("ignoring unreadable stored session: {err}");
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let payload = serde_json::to_string(session)?;
        self.storage.set(SESSION_KEY, &payload)?;
        info!("session stored for {}", session.user.email);
        Ok(())
    }

    /// Drops the stored session. Safe to call without one. On error the
    /// session is still stored, in memory and on disk.
    pub fn clear(&self) -> Result<(), StorageError> {
        if self.storage.get(SESSION_KEY).is_none() {
            return Ok(());
        }
        self.storage.remove(SESSION_KEY)?;
        info!("session cleared");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.session().map(|session| session.token)
    }

    pub fn current_user(&self) -> Option<User> {
        self.session().map(|session| session.user)
    }

    /// Token presence only; an expired token still counts until the backend
    /// rejects it.
    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use crate::storage::{FileStorage, MemoryStorage};

    fn session() -> Session {
        Session {
            token: "tok".to_string(),
            user: User {
                id: 1,
                email: "admin@anders.com".to_string(),
                role: Role::Admin,
                name: None,
            },
        }
    }

    #[test]
    fn save_then_clear_round_trips_state() {
        let store = SessionStore::new(Arc::new(MemoryStorage::new()));
        assert!(!store.is_authenticated());

        store.save(&session()).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.token().as_deref(), Some("tok"));
        assert_eq!(store.current_user().unwrap().role, Role::Admin);

        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(store.current_user(), None);
    }

    #[test]
    fn failed_clear_is_reported_and_keeps_the_session() {
        let path = std::env::temp_dir().join(format!(
            "dashboard_client_session_{}.json",
            std::process::id()
        ));
        let storage = Arc::new(FileStorage::open(&path));
        let store = SessionStore::new(storage);
        store.save(&session()).unwrap();

        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(store.clear().is_err());
        assert!(store.is_authenticated());

        std::fs::remove_dir(&path).unwrap();
        store.clear().unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(FileStorage::open(&path).get(SESSION_KEY), None);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn garbage_in_storage_reads_as_anonymous() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(SESSION_KEY, "{broken").unwrap();
        let store = SessionStore::new(storage);
        assert!(!store.is_authenticated());
        assert_eq!(store.current_user(), None);
    }
}
