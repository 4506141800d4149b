use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::store::{KeyValueStore, StorageError};

/// In-memory [`KeyValueStore`], used by tests and as an ephemeral store.
///
/// Keys iterate in lexicographic order, which keeps scans deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store, for seeding test fixtures.
    pub async fn seed(
        &self,
        pairs: &[(&str, &str)],
    ) {
        let mut entries = self.entries.write().await;
        for (k, v) in pairs {
            entries.insert((*k).to_string(), (*v).to_string());
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn multi_get(
        &self,
        keys: &[String],
    ) -> Result<Vec<(String, Option<String>)>, StorageError> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .map(|k| (k.clone(), entries.get(k).cloned()))
            .collect())
    }

    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        for (k, v) in pairs {
            entries.insert(k.clone(), v.clone());
        }
        Ok(())
    }

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        for k in keys {
            entries.remove(k);
        }
        Ok(())
    }
}
