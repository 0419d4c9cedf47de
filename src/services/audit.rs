use crate::db::{LogStore, StoreError};
use crate::models;
use std::sync::Arc;

/// Audit trail writer. A failed write is logged and swallowed; it never
/// fails the request being audited.
#[derive(Clone)]
pub struct Audit {
    logs: Arc<dyn LogStore>,
}

impl Audit {
    pub fn new(logs: Arc<dyn LogStore>) -> Self {
        Self { logs }
    }

    pub async fn record(&self, kind: &str, details: impl Into<String>) {
        let entry = models::LogEntry::new(kind, details);
        if let Err(err) = self.logs.append(&entry).await {
            tracing::warn!(kind, "Error logging audit event: {}", err);
        }
    }

    pub async fn list(&self) -> Result<Vec<models::LogEntry>, StoreError> {
        self.logs.list().await
    }
}
