//! `PostgreSQL` JSONB document backend.
//!
//! # Tables
//!
//! - `documents(collection, id, body, created_at, updated_at)`
//! - `id_sequences(collection, last_value)`
//!
//! Both are created by the migrations in `crates/cloud/migrations/`.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use super::backend::{BackendError, DocumentBackend};

/// The primary backend.
#[derive(Debug, Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentBackend for PostgresBackend {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), BackendError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn scan(&self, collection: &str) -> Result<Vec<(String, Value)>, BackendError> {
        let rows = sqlx::query_as::<_, (String, Value)>(
            "SELECT id, body FROM documents WHERE collection = $1",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>, BackendError> {
        let body = sqlx::query_scalar::<_, Value>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(body)
    }

    async fn put(&self, collection: &str, key: &str, body: &Value) -> Result<(), BackendError> {
        sqlx::query(
            r"
            INSERT INTO documents (collection, id, body)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET body = EXCLUDED.body, updated_at = NOW()
            ",
        )
        .bind(collection)
        .bind(key)
        .bind(body)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, BackendError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn next_sequence(&self, collection: &str) -> Result<i64, BackendError> {
        let value = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO id_sequences (collection, last_value)
            VALUES ($1, 1)
            ON CONFLICT (collection)
            DO UPDATE SET last_value = id_sequences.last_value + 1
            RETURNING last_value
            ",
        )
        .bind(collection)
        .fetch_one(&self.pool)
        .await?;
        Ok(value)
    }

    async fn observe_sequence(&self, collection: &str, value: i64) -> Result<(), BackendError> {
        sqlx::query(
            r"
            INSERT INTO id_sequences (collection, last_value)
            VALUES ($1, $2)
            ON CONFLICT (collection)
            DO UPDATE SET last_value = GREATEST(id_sequences.last_value, EXCLUDED.last_value)
            ",
        )
        .bind(collection)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
