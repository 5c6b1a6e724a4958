//! Durable credential storage.
//!
//! Credentials live in a key-value store of strings behind the
//! [`CredentialStore`] trait, with three interchangeable backends: an
//! in-memory map, a JSON file, and the OS keychain. [`TokenStore`] layers the
//! credential-bundle rules on top: the `user`, `accessToken` and
//! `refreshToken` keys are written and cleared together.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use keyring::Entry;

use crate::models::User;

/// Storage key for the serialized user record.
const KEY_USER: &str = "user";

/// Storage key for the access token.
const KEY_ACCESS_TOKEN: &str = "accessToken";

/// Storage key for the refresh token.
const KEY_REFRESH_TOKEN: &str = "refreshToken";

/// Key-value storage of credential strings.
///
/// Reads are non-throwing: a missing key or unreadable backend yields `None`.
/// Writes may fail; there is no partial-write recovery across keys.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory backend for tests and embedding.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("credential map poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| anyhow::anyhow!("credential map poisoned"))?
            .remove(key);
        Ok(())
    }
}

/// File backend: a JSON object of key -> value at a fixed path.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the whole map; any I/O or parse error reads as empty.
    fn read_map(&self) -> HashMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create credential directory")?;
        }
        let contents = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, contents).context("Failed to write credential file")?;
        Ok(())
    }
}

impl CredentialStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_map().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.read_map();
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut map = self.read_map();
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// OS keychain backend, one entry per key under a fixed service name.
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, key: &str) -> Option<String> {
        let entry = Entry::new(&self.service, key).ok()?;
        entry.get_password().ok()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let entry = Entry::new(&self.service, key)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(value)
            .context("Failed to store credential in keychain")?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let entry = Entry::new(&self.service, key)
            .context("Failed to create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete credential from keychain"),
        }
    }
}

/// The credential bundle as read back from storage.
///
/// Missing keys yield absent fields; a stored user record that fails to parse
/// also reads as absent.
#[derive(Debug, Clone, Default)]
pub struct StoredCredentials {
    pub user: Option<User>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl StoredCredentials {
    /// True when every field of the bundle is present.
    pub fn is_complete(&self) -> bool {
        self.user.is_some() && self.access_token.is_some() && self.refresh_token.is_some()
    }
}

/// Durable storage of the credential bundle.
///
/// Clone is cheap - backends are shared through an `Arc`.
#[derive(Clone)]
pub struct TokenStore {
    store: Arc<dyn CredentialStore>,
}

impl TokenStore {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Read the stored bundle. Never fails; missing keys read as absent.
    pub fn read(&self) -> StoredCredentials {
        StoredCredentials {
            user: self
                .store
                .get(KEY_USER)
                .and_then(|raw| serde_json::from_str(&raw).ok()),
            access_token: self.store.get(KEY_ACCESS_TOKEN),
            refresh_token: self.store.get(KEY_REFRESH_TOKEN),
        }
    }

    /// Write the full bundle. The three keys are written together; if the
    /// backend fails mid-write the store may be left partial (accepted risk,
    /// a later read treats the partial bundle as unauthenticated).
    pub fn write(&self, user: &User, access_token: &str, refresh_token: &str) -> Result<()> {
        let user_json = serde_json::to_string(user)?;
        self.store.put(KEY_USER, &user_json)?;
        self.store.put(KEY_ACCESS_TOKEN, access_token)?;
        self.store.put(KEY_REFRESH_TOKEN, refresh_token)?;
        Ok(())
    }

    /// Replace only the access token; user and refresh token stay as stored.
    pub fn write_access_token(&self, access_token: &str) -> Result<()> {
        self.store.put(KEY_ACCESS_TOKEN, access_token)
    }

    /// Remove all three keys. Idempotent; backend errors are swallowed so a
    /// clear can always be used as a last resort.
    pub fn clear(&self) {
        let _ = self.store.remove(KEY_USER);
        let _ = self.store.remove(KEY_ACCESS_TOKEN);
        let _ = self.store.remove(KEY_REFRESH_TOKEN);
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(KEY_ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(KEY_REFRESH_TOKEN)
    }
}
