//! Record store port for finalized feedback.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::opinion::OpinionRecord;

/// Port for persisting finalized opinion records.
#[async_trait]
pub trait OpinionStore: Send + Sync {
    /// Persists one record.
    async fn put(&self, record: &OpinionRecord) -> Result<(), StoreError>;
}

/// Persistence errors, shared by the record and survey stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database rejected or failed the operation.
    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Creates a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}
