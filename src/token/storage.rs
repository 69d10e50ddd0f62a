//! Token Storage
//!
//! Persistence of the X-App token in a local key-value defaults store.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ConfigurationError, StorageError};
use crate::types::AccessToken;

/// Key-value defaults store.
pub trait DefaultsStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Set a value. Not durable until [`DefaultsStore::synchronize`].
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Flush pending writes to durable storage.
    fn synchronize(&self) -> Result<(), StorageError>;
}

/// Persisted key names.
pub struct DefaultsKeys;

impl DefaultsKeys {
    pub const TOKEN_KEY: &'static str = "TokenKey";
    pub const TOKEN_EXPIRY: &'static str = "TokenExpiry";
}

/// In-memory defaults store.
#[derive(Default)]
pub struct InMemoryDefaults {
    values: Mutex<HashMap<String, String>>,
    sync_count: Mutex<usize>,
    should_fail: Mutex<bool>,
}

impl InMemoryDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a value.
    pub fn with_value(self, key: &str, value: impl Into<String>) -> Self {
        self.values.lock().insert(key.to_string(), value.into());
        self
    }

    /// Make every write and flush fail.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock() = should_fail;
        self
    }

    /// Number of successful flushes.
    pub fn sync_count(&self) -> usize {
        *self.sync_count.lock()
    }

    fn check_error(&self) -> Result<(), StorageError> {
        if *self.should_fail.lock() {
            return Err(StorageError::WriteFailed {
                message: "Mock storage failure".to_string(),
            });
        }
        Ok(())
    }
}

impl DefaultsStore for InMemoryDefaults {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.check_error()?;
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn synchronize(&self) -> Result<(), StorageError> {
        self.check_error()?;
        *self.sync_count.lock() += 1;
        Ok(())
    }
}

/// Defaults store backed by a JSON object on disk.
///
/// Writes are buffered in memory; `synchronize` writes a temp file, fsyncs it,
/// and renames it over the target.
pub struct JsonFileDefaults {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl JsonFileDefaults {
    /// Open the store, starting empty if the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read_file(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable defaults file");
                BTreeMap::new()
            }
        };

        Self {
            path,
            values: Mutex::new(values),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(StorageError::ReadFailed {
                    message: e.to_string(),
                })
            }
        };

        serde_json::from_str(&contents).map_err(|e| StorageError::CorruptedData {
            message: e.to_string(),
        })
    }
}

impl DefaultsStore for JsonFileDefaults {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn synchronize(&self) -> Result<(), StorageError> {
        let write_failed = |e: std::io::Error| StorageError::WriteFailed {
            message: e.to_string(),
        };

        let contents = {
            let values = self.values.lock();
            serde_json::to_vec_pretty(&*values).map_err(|e| StorageError::WriteFailed {
                message: e.to_string(),
            })?
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(write_failed)?;
            }
        }

        let tmp = self.path.with_extension("tmp");
        let mut file = fs::File::create(&tmp).map_err(write_failed)?;
        file.write_all(&contents).map_err(write_failed)?;
        file.sync_all().map_err(write_failed)?;
        fs::rename(&tmp, &self.path).map_err(write_failed)?;

        Ok(())
    }
}

/// Reads and writes the application token through a defaults store.
///
/// Neither operation fails: an absent or malformed token loads as
/// [`AccessToken::empty`], and persistence failures are logged.
#[derive(Clone)]
pub struct TokenStore {
    defaults: Arc<dyn DefaultsStore>,
}

impl TokenStore {
    pub fn new(defaults: Arc<dyn DefaultsStore>) -> Self {
        Self { defaults }
    }

    /// Load the persisted token.
    pub fn load(&self) -> AccessToken {
        match self.try_load() {
            Ok(Some(token)) => token,
            Ok(None) => AccessToken::empty(),
            Err(e) => {
                warn!(error = %e, "Discarding persisted token");
                AccessToken::empty()
            }
        }
    }

    fn try_load(&self) -> Result<Option<AccessToken>, ConfigurationError> {
        let read = |key: &str| {
            self.defaults
                .get(key)
                .map_err(|e| ConfigurationError::MalformedToken {
                    key: key.to_string(),
                    message: e.to_string(),
                })
        };

        let token = read(DefaultsKeys::TOKEN_KEY)?;
        let expiry = read(DefaultsKeys::TOKEN_EXPIRY)?;

        let (token, expiry) = match (token, expiry) {
            (Some(token), Some(expiry)) => (token, expiry),
            _ => return Ok(None),
        };

        let expires_at = DateTime::parse_from_rfc3339(expiry.trim())
            .map_err(|e| ConfigurationError::MalformedToken {
                key: DefaultsKeys::TOKEN_EXPIRY.to_string(),
                message: e.to_string(),
            })?
            .with_timezone(&Utc);

        Ok(Some(AccessToken::new(token, expires_at)))
    }

    /// Persist both fields and flush before returning.
    pub fn save(&self, token: &AccessToken) {
        let result = self
            .defaults
            .set(DefaultsKeys::TOKEN_KEY, token.secret().to_string())
            .and_then(|_| {
                self.defaults
                    .set(DefaultsKeys::TOKEN_EXPIRY, token.expires_at().to_rfc3339())
            })
            .and_then(|_| self.defaults.synchronize());

        match result {
            Ok(()) => debug!(expires_at = %token.expires_at(), "Persisted X-App token"),
            Err(e) => warn!(error = %e, "Failed to persist X-App token"),
        }
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn store_with(defaults: InMemoryDefaults) -> TokenStore {
        TokenStore::new(Arc::new(defaults))
    }

    #[test]
    fn test_load_absent_is_empty() {
        let token = store_with(InMemoryDefaults::new()).load();
        assert_eq!(token, AccessToken::empty());
        assert!(!token.is_valid());
    }

    #[test]
    fn test_load_with_only_one_field_is_empty() {
        let defaults = InMemoryDefaults::new().with_value(DefaultsKeys::TOKEN_KEY, "abc");
        assert!(!store_with(defaults).load().is_valid());
    }

    #[test]
    fn test_load_malformed_expiry_is_empty() {
        let defaults = InMemoryDefaults::new()
            .with_value(DefaultsKeys::TOKEN_KEY, "abc")
            .with_value(DefaultsKeys::TOKEN_EXPIRY, "next tuesday");
        assert_eq!(store_with(defaults).load(), AccessToken::empty());
    }

    #[test]
    fn test_save_then_load() {
        let defaults = Arc::new(InMemoryDefaults::new());
        let store = TokenStore::new(defaults.clone());
        let token = AccessToken::new("abc", Utc::now() + Duration::days(7));

        store.save(&token);

        assert_eq!(defaults.sync_count(), 1);
        let loaded = store.load();
        assert_eq!(loaded.secret(), "abc");
        assert_eq!(loaded.expires_at().timestamp(), token.expires_at().timestamp());
        assert!(loaded.is_valid());
    }

    #[test]
    fn test_save_failure_is_silent() {
        let defaults = Arc::new(InMemoryDefaults::new());
        defaults.set_should_fail(true);
        let store = TokenStore::new(defaults.clone());

        store.save(&AccessToken::new("abc", Utc::now() + Duration::days(1)));

        assert_eq!(defaults.sync_count(), 0);
        assert!(!store.load().is_valid());
    }

    #[test]
    fn test_json_file_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaults.json");
        let token = AccessToken::new("persisted", Utc::now() + Duration::days(7));

        TokenStore::new(Arc::new(JsonFileDefaults::open(&path))).save(&token);

        let reopened = TokenStore::new(Arc::new(JsonFileDefaults::open(&path))).load();
        assert_eq!(reopened.secret(), "persisted");
        assert!(reopened.is_valid());
    }

    #[test]
    fn test_json_file_corrupt_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaults.json");
        fs::write(&path, "{not json").unwrap();

        let defaults = JsonFileDefaults::open(&path);
        assert_eq!(defaults.get(DefaultsKeys::TOKEN_KEY).unwrap(), None);
        assert!(!TokenStore::new(Arc::new(defaults)).load().is_valid());
    }
}
