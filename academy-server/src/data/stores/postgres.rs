use async_trait::async_trait;
use sqlx::PgPool;

use crate::data::kv_store::{KvStore, StorageError};

#[derive(Debug, Clone)]
pub(crate) struct PostgresKvStore {
    pool: PgPool,
}

impl PostgresKvStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvStore for PostgresKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT value
            FROM kv_slots
            WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_kv_db_error)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO kv_slots (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value,
                          updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(map_kv_db_error)?;

        Ok(())
    }
}

fn map_kv_db_error(err: sqlx::Error) -> StorageError {
    StorageError::Unavailable(err.to_string())
}
