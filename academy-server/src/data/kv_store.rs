use async_trait::async_trait;
use thiserror::Error;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        DomainError::StorageUnavailable(err.to_string())
    }
}

/// Durable string slots addressed by key.
///
/// Every `set` replaces the whole value of a slot; readers never observe a
/// partially written value.
#[async_trait]
pub(crate) trait KvStore: Send + Sync {
    /// Returns `None` when the slot was never written.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}
