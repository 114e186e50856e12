//! # Container Repository
//!
//! A named-slot key/value container over the `kv_store` table. The item
//! store keeps its whole collection in one slot; nothing here knows what the
//! text means.

use sqlx::SqlitePool;
use tracing::debug;
use whatstock_core::Timestamp;

use crate::error::DbResult;

/// Repository for raw slot access.
#[derive(Debug, Clone)]
pub struct ContainerRepository {
    pool: SqlitePool,
}

impl ContainerRepository {
    /// Creates a new ContainerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ContainerRepository { pool }
    }

    /// Reads a slot. `None` when the slot has never been written or was removed.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(value)
    }

    /// Writes a slot, replacing any previous content.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        debug!(key = %key, bytes = value.len(), "Writing container slot");

        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Timestamp::now().format())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes a slot. Returns whether it existed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        debug!(key = %key, "Removing container slot");

        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_put_get_remove() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let slots = db.container();

        assert_eq!(slots.get("k").await.unwrap(), None);

        slots.put("k", "one").await.unwrap();
        slots.put("k", "two").await.unwrap();
        assert_eq!(slots.get("k").await.unwrap().as_deref(), Some("two"));

        assert!(slots.remove("k").await.unwrap());
        assert!(!slots.remove("k").await.unwrap());
        assert_eq!(slots.get("k").await.unwrap(), None);
    }
}
