//! Durable client-side state.
//!
//! The client persists exactly two values: the bearer token and the
//! critical-backend-misconfiguration flag. Cart and coupon state are
//! session-memory only and never touch storage.
//!
//! [`ClientStorage`] is the key-value seam; [`TokenStore`] is the typed view
//! the rest of the crate goes through so no call site touches raw keys.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Storage key of the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Storage key of the critical-backend-misconfiguration flag.
pub const CRITICAL_ERROR_KEY: &str = "api_critical_error";

/// Errors raised by persistent storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the state file failed.
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The state file is not a JSON object of strings.
    #[error("state file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// A string key-value store that survives restarts (or pretends to).
pub trait ClientStorage: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value could not be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the removal could not be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Lock a mutex, recovering the data if a holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local storage, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.values).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.values).remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object file, rewritten whole on every mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the state file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Location of the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(values)?)?;
        Ok(())
    }
}

impl ClientStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.values).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut values = lock(&self.values);
        values.insert(key.to_owned(), value.to_owned());
        self.flush(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut values = lock(&self.values);
        if values.remove(key).is_some() {
            self.flush(&values)?;
        }
        Ok(())
    }
}

/// Typed access to the persisted token and critical-error flag.
///
/// Write failures are logged and otherwise ignored: losing a persisted token
/// only costs the user a login, and must never fail the request that
/// triggered the write.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn ClientStorage>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("has_token", &self.has_token())
            .field("critical_error", &self.critical_error())
            .finish()
    }
}

impl TokenStore {
    /// Wrap a storage backend.
    #[must_use]
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self { storage }
    }

    /// A store backed by [`MemoryStorage`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// The persisted bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.storage
            .get(AUTH_TOKEN_KEY)
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
    }

    /// Whether a bearer token is persisted.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// Persist a new bearer token.
    pub fn set_token(&self, token: &SecretString) {
        if let Err(e) = self.storage.set(AUTH_TOKEN_KEY, token.expose_secret()) {
            tracing::error!(error = %e, "Failed to persist auth token");
        }
    }

    /// Forget the bearer token.
    pub fn clear_token(&self) {
        if let Err(e) = self.storage.remove(AUTH_TOKEN_KEY) {
            tracing::error!(error = %e, "Failed to clear auth token");
        }
    }

    /// The message of a backend misconfiguration that blocks the UI, if one
    /// has been flagged and not yet dismissed.
    #[must_use]
    pub fn critical_error(&self) -> Option<String> {
        self.storage.get(CRITICAL_ERROR_KEY)
    }

    /// Flag a backend misconfiguration.
    pub fn flag_critical_error(&self, message: &str) {
        if let Err(e) = self.storage.set(CRITICAL_ERROR_KEY, message) {
            tracing::error!(error = %e, "Failed to persist critical error flag");
        }
    }

    /// Clear the misconfiguration flag after the user dismisses the blocking page.
    pub fn dismiss_critical_error(&self) {
        if let Err(e) = self.storage.remove(CRITICAL_ERROR_KEY) {
            tracing::error!(error = %e, "Failed to clear critical error flag");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k"), None);
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").as_deref(), Some("v"));
        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert_eq!(storage.get("k"), None);
    }

    #[test]
    fn test_file_storage_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(AUTH_TOKEN_KEY, "abc").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(AUTH_TOKEN_KEY).as_deref(), Some("abc"));
        reopened.remove(AUTH_TOKEN_KEY).unwrap();

        let again = FileStorage::open(&path).unwrap();
        assert_eq!(again.get(AUTH_TOKEN_KEY), None);
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_token_store() {
        let tokens = TokenStore::in_memory();
        assert!(!tokens.has_token());

        tokens.set_token(&SecretString::from("t0k3n"));
        assert_eq!(tokens.token().unwrap().expose_secret(), "t0k3n");

        tokens.clear_token();
        assert!(tokens.token().is_none());
    }

    #[test]
    fn test_critical_error_flag() {
        let tokens = TokenStore::in_memory();
        assert_eq!(tokens.critical_error(), None);
        tokens.flag_critical_error("Rate limiter [api] is not defined.");
        assert!(tokens.critical_error().is_some());
        tokens.dismiss_critical_error();
        assert_eq!(tokens.critical_error(), None);
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let tokens = TokenStore::in_memory();
        tokens.set_token(&SecretString::from("super-secret"));
        assert!(!format!("{tokens:?}").contains("super-secret"));
    }
}
