//! JSON key-value store backing notes and user preferences
//!
//! Each key maps to one `<key>.json` file under the data directory. Reads
//! fall back to a caller-supplied default on any failure; writes and deletes
//! log and swallow their errors so callers never have to unwind over a
//! persistence hiccup.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Fixed key for the persisted note collection.
pub const NOTES_KEY: &str = "voiceNotes";

/// Fixed key for the persisted user preferences.
pub const SETTINGS_KEY: &str = "appSettings";

/// File-backed key-value store.
#[derive(Debug, Clone)]
pub struct KvStore {
    dir: PathBuf,
}

impl KvStore {
    /// Open a store rooted at `dir`. The directory is created lazily on the
    /// first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Read and deserialize the value under `key`, returning `fallback` when
    /// the key is missing or its content does not parse.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let path = self.key_path(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("kv: failed to read {}: {}", path.display(), e);
                }
                return fallback;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("kv: failed to parse {}: {}", path.display(), e);
                fallback
            }
        }
    }

    /// Serialize and persist `value` under `key`. Failures are logged and
    /// swallowed.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        let path = self.key_path(key);

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("kv: failed to serialize {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!("kv: failed to create {}: {}", self.dir.display(), e);
            return;
        }

        if let Err(e) = tokio::fs::write(&path, raw).await {
            tracing::warn!("kv: failed to write {}: {}", path.display(), e);
        }
    }

    /// Delete the value under `key`, if present. Failures are logged and
    /// swallowed.
    pub async fn remove(&self, key: &str) {
        let path = self.key_path(key);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("kv: failed to remove {}: {}", path.display(), e);
            }
        }
    }

    /// Directory this store writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
