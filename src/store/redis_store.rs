// Redis-backed key-value store
//
// Every key is namespaced as `<namespace>:<key>` so several clients can
// share one Redis database. `clear` only touches keys under the namespace.
//
// One connection is opened lazily and reused for every command. It is
// dropped after a failed command and reopened on the next one.

use std::sync::Mutex;

use redis::{Commands, RedisResult};
use tracing::{debug, warn};

use crate::store::{KeyValueStore, StorageError, StorageResult};

/// Durable store shared through Redis
pub struct RedisStore {
    client: redis::Client,
    connection: Mutex<Option<redis::Connection>>,
    namespace: String,
}

impl RedisStore {
    /// Open a client for `url`; no connection is made until the first command
    pub fn open(url: &str, namespace: impl Into<String>) -> StorageResult<Self> {
        let client = redis::Client::open(url)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
            namespace: namespace.into(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.namespace, key)
    }

    /// Run `op` on the shared connection, opening it first if needed
    fn with_connection<T>(
        &self,
        op: impl FnOnce(&mut redis::Connection) -> RedisResult<T>,
    ) -> StorageResult<T> {
        let mut slot = self
            .connection
            .lock()
            .map_err(|_| StorageError::Unavailable("redis connection lock poisoned".to_string()))?;
        let con = match slot.take() {
            Some(con) => slot.insert(con),
            None => slot.insert(self.client.get_connection()?),
        };

        let result = op(con);
        if let Err(err) = &result {
            warn!("Redis command failed, dropping connection: {}", err);
            *slot = None;
        }
        Ok(result?)
    }
}

impl KeyValueStore for RedisStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let key = self.namespaced(key);
        self.with_connection(|con| con.get(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let key = self.namespaced(key);
        self.with_connection(|con| con.set::<_, _, ()>(key, value))
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let key = self.namespaced(key);
        self.with_connection(|con| con.del::<_, ()>(key))
    }

    fn clear(&self) -> StorageResult<()> {
        let pattern = format!("{}:*", self.namespace);
        let keys: Vec<String> = self.with_connection(|con| {
            con.scan_match::<_, String>(&pattern)
                .map(|iter| iter.collect())
        })?;
        if keys.is_empty() {
            return Ok(());
        }
        debug!("Clearing {} redis keys under {}", keys.len(), pattern);
        self.with_connection(|con| con.del::<_, ()>(keys))
    }
}
