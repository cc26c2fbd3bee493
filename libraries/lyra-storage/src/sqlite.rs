//! `SQLite`-backed session store
//!
//! One row per key in `session_values`, values stored as JSON text.

use async_trait::async_trait;
use lyra_core::SessionStore;
use sqlx::{Row, SqlitePool};

use crate::error::{Result, StorageError};

/// Session store persisted in a `SQLite` database
#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: SqlitePool,
}

impl SqliteSessionStore {
    /// Wrap a pool whose migrations have already been applied
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get a single value
    ///
    /// Returns `Ok(Some(value))` if the key exists, `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails or the stored text is not JSON
    pub async fn get_value(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let row = sqlx::query("SELECT value FROM session_values WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let text: String = row.try_get("value")?;
                let value: serde_json::Value = serde_json::from_str(&text)
                    .map_err(|e| StorageError::SerializationError(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Insert or replace a value
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn set_value(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let text = serde_json::to_string(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            "INSERT INTO session_values (key, value, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(text)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a value
    ///
    /// Returns whether a row was removed
    pub async fn remove_value(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM session_values WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List every stored key, sorted
    pub async fn keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM session_values ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("key").map_err(StorageError::from))
            .collect()
    }

    /// Remove every stored value
    pub async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM session_values")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, key: &str) -> lyra_core::Result<Option<serde_json::Value>> {
        Ok(self.get_value(key).await?)
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> lyra_core::Result<()> {
        tracing::trace!(key, "Persisting session value");
        Ok(self.set_value(key, value).await?)
    }

    async fn remove(&self, key: &str) -> lyra_core::Result<bool> {
        Ok(self.remove_value(key).await?)
    }
}
