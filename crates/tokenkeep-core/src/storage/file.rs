use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Storage, StorageError};

/// Application name used for the storage directory
const APP_NAME: &str = "tokenkeep";

/// Storage file name in each origin directory
const STORAGE_FILE: &str = "storage.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StorageDocument {
    entries: BTreeMap<String, String>,
    updated_at: DateTime<Utc>,
}

impl Default for StorageDocument {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            updated_at: Utc::now(),
        }
    }
}

/// Durable storage substrate scoped to a single origin.
///
/// Every operation re-reads the document from disk, so writes made by other
/// processes sharing the origin are observed. There is no locking: the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Open the substrate for `origin` under the platform cache directory.
    /// Returns `None` when the platform has no cache directory.
    pub fn open(origin: &str) -> Option<Self> {
        let cache_dir = dirs::cache_dir()?;
        Some(Self::in_dir(&cache_dir.join(APP_NAME), origin))
    }

    /// Open the substrate for `origin` below an explicit base directory
    pub fn in_dir(base: &Path, origin: &str) -> Self {
        Self {
            path: base.join(origin_slug(origin)).join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Time of the last write, if anything was ever written
    pub fn updated_at(&self) -> Result<Option<DateTime<Utc>>, StorageError> {
        Ok(self.load()?.map(|doc| doc.updated_at))
    }

    fn load(&self) -> Result<Option<StorageDocument>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    /// Load the document for modification. A corrupt document is reported
    /// as `Err(None)` so the caller can replace it and stay writable.
    fn load_for_write(&self) -> Result<Option<StorageDocument>, Option<StorageError>> {
        match self.load() {
            Ok(doc) => Ok(doc),
            Err(StorageError::Corrupt(e)) => {
                warn!(path = %self.path.display(), error = %e, "Discarding corrupt storage document");
                Err(None)
            }
            Err(e) => Err(Some(e)),
        }
    }

    /// Write through a temporary file and rename, so readers never see a
    /// half-written document
    fn save(&self, doc: &StorageDocument) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(doc)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, contents)?;
        std::fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), entries = doc.entries.len(), "Storage saved");
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.and_then(|mut doc| doc.entries.remove(key)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut doc = match self.load_for_write() {
            Ok(doc) => doc.unwrap_or_default(),
            Err(None) => StorageDocument::default(),
            Err(Some(e)) => return Err(e),
        };
        doc.entries.insert(key.to_string(), value.to_string());
        doc.updated_at = Utc::now();
        self.save(&doc)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut doc = match self.load_for_write() {
            Ok(Some(doc)) => doc,
            Ok(None) => return Ok(()),
            // Nothing readable survives, so the key is gone once it is rewritten
            Err(None) => return self.save(&StorageDocument::default()),
            Err(Some(e)) => return Err(e),
        };
        if doc.entries.remove(key).is_some() {
            doc.updated_at = Utc::now();
            self.save(&doc)?;
        }
        Ok(())
    }
}

/// Directory-safe form of an origin: lowercase, non-alphanumerics become `_`
fn origin_slug(origin: &str) -> String {
    origin
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}
