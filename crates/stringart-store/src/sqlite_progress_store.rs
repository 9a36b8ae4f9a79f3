//! `SQLite` implementation of the `ProgressStore` trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use stringart_core::error::DomainError;
use stringart_core::progress::ProgressStore;

use crate::schema::CREATE_PROGRESS_TABLE;

/// SQLite-backed progress store.
#[derive(Debug, Clone)]
pub struct SqliteProgressStore {
    pool: SqlitePool,
}

impl SqliteProgressStore {
    /// Creates a new `SqliteProgressStore`.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the progress table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the statement fails.
    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::query(CREATE_PROGRESS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        Ok(())
    }
}

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(format!("progress store: {err}"))
}

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn load(&self, key: &str) -> Result<Option<String>, DomainError> {
        sqlx::query_scalar::<_, String>("SELECT value FROM progress_entries WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(infrastructure)
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), DomainError> {
        sqlx::query(
            r"
            INSERT INTO progress_entries (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;
        debug!(key, value, "progress saved");
        Ok(())
    }
}
