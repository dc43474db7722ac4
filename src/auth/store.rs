use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{storage_failed, AuthResult};

/// The fixed logical key under which the session access token is stored.
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Scoped key-value persistence for token strings.
///
/// `save` overwrites any prior value for the key; `read` returns the last
/// saved value or `None` if the key was never written. No expiry, no
/// multi-key namespacing beyond the plain key string. Faults are environment
/// errors surfaced as [`AuthError::Storage`].
///
/// [`AuthError::Storage`]: crate::error::AuthError
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Write `value` under `key`, replacing any existing value.
    async fn save(&self, key: &str, value: &str) -> AuthResult<()>;

    /// Return the last value saved under `key`, or `None` if never written.
    async fn read(&self, key: &str) -> AuthResult<Option<String>>;
}

/// In-memory token store.
///
/// Not durable across restarts; used by tests and as a harness default when
/// the host wires its own persistence around the controller.
pub struct MemoryTokenStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, key: &str, value: &str) -> AuthResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn read(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }
}

/// One stored value plus bookkeeping, as persisted in the store document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    /// The token string (opaque to this crate)
    value: String,
    /// When this entry was last written
    saved_at: DateTime<Utc>,
}

/// File-backed token store persisting a single JSON document.
///
/// The whole document is rewritten on each save: the new content goes to a
/// temp file next to the target and is renamed into place, so an interrupted
/// write never truncates the store.
pub struct JsonFileTokenStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles against the document
    write_lock: Mutex<()>,
}

impl JsonFileTokenStore {
    /// Create a store persisting to `path`. The file is created lazily on
    /// the first save; a missing file reads as an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!(path = %path.display(), "Using file-backed token store");
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// The file this store persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load_document(&self) -> AuthResult<HashMap<String, StoredValue>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let document = serde_json::from_slice(&bytes)
                    .map_err(|e| storage_failed("read", format!("malformed store file: {}", e)))?;
                Ok(document)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(storage_failed("read", e)),
        }
    }

    async fn write_document(&self, document: &HashMap<String, StoredValue>) -> AuthResult<()> {
        let bytes = serde_json::to_vec_pretty(document)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| storage_failed("write", e))?;
            }
        }

        // Write-then-rename keeps the previous document intact on a crash
        let tmp_path = self
            .path
            .with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
        tokio::fs::write(&tmp_path, &bytes)
            .await
            .map_err(|e| storage_failed("write", e))?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| storage_failed("write", e))?;

        Ok(())
    }
}

#[async_trait]
impl TokenStore for JsonFileTokenStore {
    async fn save(&self, key: &str, value: &str) -> AuthResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load_document().await?;
        document.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                saved_at: Utc::now(),
            },
        );
        self.write_document(&document).await?;

        debug!(key = key, path = %self.path.display(), "Token value persisted");
        Ok(())
    }

    async fn read(&self, key: &str) -> AuthResult<Option<String>> {
        let document = self.load_document().await?;
        Ok(document.get(key).map(|entry| entry.value.clone()))
    }
}
