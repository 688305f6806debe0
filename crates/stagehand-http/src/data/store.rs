use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Document '{id}' not found in '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("Document '{id}' already exists in '{collection}'")]
    Conflict { collection: String, id: String },

    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("Lock error on store: {0}")]
    Lock(String),
}

/// JSON document storage grouped in named collections
#[async_trait]
pub trait DataStore: Send + Sync + std::fmt::Debug {
    /// Provider name for diagnostics ("postgres", "in-memory")
    fn provider_name(&self) -> &'static str;

    /// Insert a new document; fails with [`DataError::Conflict`] if `id` exists
    async fn insert(&self, collection: &str, id: &str, document: Value) -> DataResult<()>;

    async fn get(&self, collection: &str, id: &str) -> DataResult<Option<Value>>;

    /// Every document of `collection`, ordered by id
    async fn list(&self, collection: &str) -> DataResult<Vec<Value>>;

    /// Remove a document, returning whether it existed
    async fn remove(&self, collection: &str, id: &str) -> DataResult<bool>;

    /// Check the store is reachable
    async fn ping(&self) -> DataResult<()>;
}
