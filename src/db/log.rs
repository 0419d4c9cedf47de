use super::{LogStore, StoreError};
use crate::models;
use sqlx::PgPool;
use tracing::Instrument;

pub struct PgLogStore {
    pool: PgPool,
}

impl PgLogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl LogStore for PgLogStore {
    async fn append(&self, entry: &models::LogEntry) -> Result<(), StoreError> {
        let query_span = tracing::info_span!("Appending audit log entry");
        sqlx::query(
            r#"
            INSERT INTO logs (id, timestamp, kind, details)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(entry.id)
        .bind(entry.timestamp)
        .bind(&entry.kind)
        .bind(&entry.details)
        .execute(&self.pool)
        .instrument(query_span)
        .await
        .map(|_| ())
        .map_err(StoreError::from)
    }

    async fn list(&self) -> Result<Vec<models::LogEntry>, StoreError> {
        let query_span = tracing::info_span!("Listing audit log");
        sqlx::query_as::<_, models::LogEntry>(
            "SELECT id, timestamp, kind, details FROM logs ORDER BY timestamp",
        )
        .fetch_all(&self.pool)
        .instrument(query_span)
        .await
        .map_err(StoreError::from)
    }
}
