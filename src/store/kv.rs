//! Key-value persistence adapter.
//!
//! Every higher-level store owns one key here and persists it as a single
//! serialized JSON blob. Reads fail soft: a missing or undecodable blob is
//! reported as absent (with an error log) and callers supply their own
//! defaults. Writes are atomic against the backend's native write; there are
//! no transactions, so read-modify-write sequencing is the caller's job.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::{VaultError, VaultResult};

/// A durable string-keyed blob store.
///
/// Implementations must be safe to share across threads and must make each
/// `save_raw` atomic: a concurrent reader sees either the old blob or the new
/// one, never a torn write.
pub trait KvStore: Send + Sync {
    /// Read the blob at `key`, or `None` if the key is absent or unreadable.
    fn load_raw(&self, key: &str) -> Option<String>;

    /// Replace the blob at `key`.
    fn save_raw(&self, key: &str, blob: &str) -> VaultResult<()>;

    /// Delete the blob at `key`. No-op when the key is absent.
    fn remove_raw(&self, key: &str) -> VaultResult<()>;

    /// Whether `key` currently holds a blob.
    fn contains(&self, key: &str) -> bool;
}

/// Decode the document at `key`, or `None` when absent or malformed.
///
/// A malformed blob is logged and treated as absent so a corrupt document
/// never takes the whole service down; callers fall back to their defaults.
pub fn load<T: DeserializeOwned>(kv: &dyn KvStore, key: &str) -> Option<T> {
    let blob = kv.load_raw(key)?;
    match serde_json::from_str(&blob) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(key = %key, error = %e, "failed to decode stored document");
            None
        }
    }
}

/// Encode `value` and replace the document at `key`.
pub fn save<T: Serialize>(kv: &dyn KvStore, key: &str, value: &T) -> VaultResult<()> {
    let blob =
        serde_json::to_string(value).map_err(|e| VaultError::Storage(e.to_string()))?;
    kv.save_raw(key, &blob)
}

// ============================================================================
// File backend
// ============================================================================

/// File-backed store: one `<key>.json` per key under a data directory.
///
/// Writes go to a temporary sibling file first and are renamed into place, so
/// a crash mid-write leaves the previous blob intact. Two processes pointed
/// at the same directory still race at the read-modify-write level; that is
/// the documented single-client limitation, not something this layer fixes.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the data directory at `root`.
    pub fn open(root: impl Into<PathBuf>) -> VaultResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| {
            VaultError::Storage(format!("cannot create data dir {}: {e}", root.display()))
        })?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn load_raw(&self, key: &str) -> Option<String> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Some(blob),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                tracing::error!(key = %key, error = %e, "failed to read stored document");
                None
            }
        }
    }

    fn save_raw(&self, key: &str, blob: &str) -> VaultResult<()> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, blob)
            .map_err(|e| VaultError::Storage(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| VaultError::Storage(format!("rename {}: {e}", path.display())))
    }

    fn remove_raw(&self, key: &str) -> VaultResult<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::Storage(format!("remove {key}: {e}"))),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

/// In-memory store for tests and ephemeral runs. Nothing survives the
/// process.
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn load_raw(&self, key: &str) -> Option<String> {
        self.blobs.read().expect("lock poisoned").get(key).cloned()
    }

    fn save_raw(&self, key: &str, blob: &str) -> VaultResult<()> {
        self.blobs
            .write()
            .expect("lock poisoned")
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> VaultResult<()> {
        self.blobs.write().expect("lock poisoned").remove(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> bool {
        self.blobs.read().expect("lock poisoned").contains_key(key)
    }
}
