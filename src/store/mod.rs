// Session storage
// Defines the key-value store seam and its memory, file and Redis backends

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod redis_store;

use std::path::PathBuf;
use std::sync::Arc;

pub use error::{StorageError, StorageResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Durable string key-value store
///
/// Every component that reads or writes session state goes through this
/// trait, so tests can swap in `MemoryStore` or a failing double. Operations
/// are synchronous; they are expected to be cheap compared to network I/O.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete `key`; deleting an absent key succeeds
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Delete every key owned by this store
    fn clear(&self) -> StorageResult<()>;
}

/// Which backend holds the persisted session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    Memory,
    File(PathBuf),
    Redis { url: String, namespace: String },
}

impl StoreConfig {
    /// Instantiate the configured backend
    pub fn open(&self) -> StorageResult<Arc<dyn KeyValueStore>> {
        let store: Arc<dyn KeyValueStore> = match self {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::File(path) => Arc::new(FileStore::new(path.clone())),
            StoreConfig::Redis { url, namespace } => {
                Arc::new(RedisStore::open(url, namespace.clone())?)
            }
        };
        Ok(store)
    }

    /// Short name used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            StoreConfig::Memory => "memory",
            StoreConfig::File(_) => "file",
            StoreConfig::Redis { .. } => "redis",
        }
    }
}
