use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// The local asynchronous key-value store the app persists into.
///
/// The store is local to a single app instance; there is no multi-writer
/// contention model and concurrent writes are last-write-wins per key.
/// Values are opaque strings — callers layer JSON on top.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently present, in unspecified order.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Fetches several keys at once, preserving the requested order.
    /// Missing keys yield `None` rather than being dropped.
    async fn multi_get(
        &self,
        keys: &[String],
    ) -> Result<Vec<(String, Option<String>)>, StorageError>;

    async fn multi_set(&self, pairs: &[(String, String)]) -> Result<(), StorageError>;

    async fn multi_remove(&self, keys: &[String]) -> Result<(), StorageError>;
}
