// File-backed key-value store
//
// Keeps every key in one JSON object on disk. Writes go to a sibling
// temporary file that is renamed over the original, so a crash mid-write
// leaves the previous document intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::store::{KeyValueStore, StorageError, StorageResult};

type Document = BTreeMap<String, String>;

/// Durable store persisted as a JSON document
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileStore {
    /// Create a store at `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> StorageResult<Document> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Document::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Document::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_document(&self, document: &Document) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(document)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote {} keys to {}", document.len(), self.path.display());
        Ok(())
    }

    fn update<F>(&self, mutate: F) -> StorageResult<()>
    where
        F: FnOnce(&mut Document),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Unavailable("file store lock poisoned".to_string()))?;
        let mut document = self.read_document()?;
        mutate(&mut document);
        self.write_document(&document)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Unavailable("file store lock poisoned".to_string()))?;
        Ok(self.read_document()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update(|document| {
            document.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.update(|document| {
            document.remove(key);
        })
    }

    fn clear(&self) -> StorageResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Unavailable("file store lock poisoned".to_string()))?;
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
