// crates/network/src/session.rs
//! Signed-in session storage
//!
//! The bearer token and the user record returned by `/auth/login` live in a
//! `SessionStore`. The API client reads the token for every authenticated
//! request and clears the store when the backend reports the token invalid.

use crate::error::{NetworkError, NetworkResult};
use chrono::{DateTime, Utc};
use museu_core::User;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Callback invoked once when a session is torn down by the backend
pub type SessionListener = Arc<dyn Fn(&Session) + Send + Sync>;

/// A signed-in session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: Option<User>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, user: Option<User>) -> Self {
        Self {
            token: token.into(),
            user,
            created_at: Utc::now(),
        }
    }

    /// Name to greet the reader with
    pub fn display_name(&self) -> &str {
        self.user
            .as_ref()
            .map(|u| u.first_name())
            .unwrap_or("reader")
    }
}

/// Where the session is kept between requests
pub trait SessionStore: Send + Sync {
    /// Current session, if any
    fn load(&self) -> NetworkResult<Option<Session>>;

    /// Replaces the stored session
    fn save(&self, session: &Session) -> NetworkResult<()>;

    /// Removes the stored session, returning it if there was one
    fn clear(&self) -> NetworkResult<Option<Session>>;
}

/// Session kept in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with a session
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> NetworkResult<Option<Session>> {
        let session = self.session.lock().map_err(|_| poisoned())?;
        Ok(session.clone())
    }

    fn save(&self, session: &Session) -> NetworkResult<()> {
        let mut slot = self.session.lock().map_err(|_| poisoned())?;
        *slot = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> NetworkResult<Option<Session>> {
        let mut slot = self.session.lock().map_err(|_| poisoned())?;
        Ok(slot.take())
    }
}

/// Session persisted as a JSON file, written atomically
pub struct FileSessionStore {
    path: PathBuf,
    // Serializes clear() so concurrent teardowns observe the session once
    guard: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> NetworkResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> NetworkResult<Option<Session>> {
        let _guard = self.guard.lock().map_err(|_| poisoned())?;
        self.read()
    }

    fn save(&self, session: &Session) -> NetworkResult<()> {
        let _guard = self.guard.lock().map_err(|_| poisoned())?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let body = serde_json::to_string_pretty(session)
            .map_err(|e| NetworkError::Decode(e.to_string()))?;

        let mut temp_file = NamedTempFile::new_in(&dir)?;
        temp_file.write_all(body.as_bytes())?;
        temp_file.flush()?;
        temp_file.persist(&self.path).map_err(|e| e.error)?;

        log::debug!("Session saved to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> NetworkResult<Option<Session>> {
        let _guard = self.guard.lock().map_err(|_| poisoned())?;

        let previous = self.read()?;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(previous)
    }
}

fn poisoned() -> NetworkError {
    NetworkError::Io(std::io::Error::other("session lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new("abc.def", Some(User::new("3", "Clarice Lispector", "c@museu.br")))
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save(&session()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().token, "abc.def");

        assert!(store.clear().unwrap().is_some());
        assert!(store.clear().unwrap().is_none());
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileSessionStore::new(&path).save(&session()).unwrap();

        let reopened = FileSessionStore::new(&path);
        let loaded = reopened.load().unwrap().unwrap();
        assert_eq!(loaded, session_with_time(loaded.created_at));
        assert_eq!(loaded.display_name(), "Clarice");
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));

        store.save(&session()).unwrap();
        assert!(store.clear().unwrap().is_some());
        assert!(!store.path().exists());
        assert!(store.clear().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_session_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(FileSessionStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_display_name_without_user() {
        assert_eq!(Session::new("t", None).display_name(), "reader");
    }

    fn session_with_time(created_at: DateTime<Utc>) -> Session {
        Session {
            created_at,
            ..session()
        }
    }
}
