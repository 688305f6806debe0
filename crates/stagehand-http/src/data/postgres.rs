use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::Row;
use tokio::sync::OnceCell;
use tracing::debug;

use super::store::{DataError, DataResult, DataStore};

const CREATE_DOCUMENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body JSONB NOT NULL,
    PRIMARY KEY (collection, id)
)";

/// Build a pool that connects on first use
///
/// Idle and lifetime reaping are disabled so the pool can be created outside
/// a tokio runtime, e.g. while a host is being composed.
pub(crate) fn lazy_pool(connection_string: &str, acquire_timeout: Duration) -> DataResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(acquire_timeout)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_lazy(connection_string)
        .map_err(|e| DataError::Connection(e.to_string()))
}

/// [`DataStore`] over a Postgres `documents` table holding JSONB bodies
#[derive(Debug)]
pub struct PostgresDataStore {
    pool: PgPool,
    schema: OnceCell<()>,
}

impl PostgresDataStore {
    /// Create a store; no connection is opened until the first query
    pub fn connect_lazy(connection_string: &str) -> DataResult<Self> {
        Ok(Self::from_pool(lazy_pool(
            connection_string,
            Duration::from_secs(5),
        )?))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            schema: OnceCell::new(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn ensure_schema(&self) -> DataResult<()> {
        self.schema
            .get_or_try_init(|| async {
                debug!("ensuring documents table exists");
                sqlx::query(CREATE_DOCUMENTS_TABLE)
                    .execute(&self.pool)
                    .await
                    .map(|_| ())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl DataStore for PostgresDataStore {
    fn provider_name(&self) -> &'static str {
        "postgres"
    }

    async fn insert(&self, collection: &str, id: &str, document: Value) -> DataResult<()> {
        self.ensure_schema().await?;
        let result = sqlx::query(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(document))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DataError::Conflict {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> DataResult<Option<Value>> {
        self.ensure_schema().await?;
        let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(|row| row.try_get::<Json<Value>, _>("body"))
            .transpose()?
            .map(|body| body.0))
    }

    async fn list(&self, collection: &str) -> DataResult<Vec<Value>> {
        self.ensure_schema().await?;
        let rows = sqlx::query("SELECT body FROM documents WHERE collection = $1 ORDER BY id")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<Json<Value>, _>("body")?.0))
            .collect()
    }

    async fn remove(&self, collection: &str, id: &str) -> DataResult<bool> {
        self.ensure_schema().await?;
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> DataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
