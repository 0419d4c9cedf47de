use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One audit trail record.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct LogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub kind: String,
    pub details: String,
}

impl LogEntry {
    pub fn new(kind: &str, details: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            kind: kind.to_string(),
            details: details.into(),
        }
    }
}
