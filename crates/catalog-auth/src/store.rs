//! Session persistence.
//!
//! The CLI runs one process per screen, so the session issued at sign-in
//! must survive between invocations. The seam is a small synchronous trait;
//! the default backend is a mode-0600 JSON file under `~/.librarium`.

use crate::{AuthResult, Session};
use catalog_core::Paths;
use std::path::PathBuf;
use std::sync::Mutex;

/// Trait for session persistence backends.
pub trait SessionStore: Send + Sync {
    /// Load the persisted session, if any.
    fn load(&self) -> AuthResult<Option<Session>>;

    /// Persist a session, replacing any previous one.
    fn save(&self, session: &Session) -> AuthResult<()>;

    /// Remove the persisted session.
    fn clear(&self) -> AuthResult<()>;

    /// Check whether a session is persisted.
    fn has_session(&self) -> AuthResult<bool> {
        Ok(self.load()?.is_some())
    }
}

/// File-backed session store.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Create a store at the default location (~/.librarium/session.json).
    pub fn new() -> AuthResult<Self> {
        let paths = Paths::new().map_err(|e| crate::AuthError::Config(e.to_string()))?;
        paths
            .ensure_dirs()
            .map_err(|e| crate::AuthError::Config(e.to_string()))?;
        Ok(Self {
            path: paths.session_file(),
        })
    }

    /// Create a store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> AuthResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> AuthResult<()> {
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;

        // The file holds a bearer token; keep it owner-readable only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory session store for testing.
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            session: Mutex::new(None),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> AuthResult<Option<Session>> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> AuthResult<()> {
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            access_token: "token-abc".to_string(),
            user_id: "user-1".to_string(),
            email: Some("reader@example.com".to_string()),
            expires_at: "2030-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemorySessionStore::new();
        assert!(store.load().unwrap().is_none());
        assert!(!store.has_session().unwrap());

        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().access_token, "token-abc");
        assert!(store.has_session().unwrap());

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileSessionStore::with_path(tmp.path().join("session.json"));

        assert!(store.load().unwrap().is_none());

        store.save(&session()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.user_id, "user-1");
        assert_eq!(loaded.email.as_deref(), Some("reader@example.com"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn file_store_clear_without_file_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileSessionStore::with_path(tmp.path().join("missing.json"));
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("session.json");
        let store = FileSessionStore::with_path(path.clone());
        store.save(&session()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
