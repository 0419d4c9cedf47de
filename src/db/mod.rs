//! Storage collaborators.
//!
//! Every store is a trait so handlers and services never depend on a
//! particular backend. `postgres` talks to PostgreSQL through sqlx,
//! `memory` keeps everything in process and backs the tests.

pub mod loan;
pub mod log;
pub mod memory;
pub mod user;

use crate::models;
use uuid::Uuid;

pub use loan::PgLoanStore;
pub use log::PgLogStore;
pub use memory::{MemoryLoanStore, MemoryLogStore, MemoryUserStore};
pub use user::PgUserStore;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    /// A verified account already holds the email.
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            err => {
                tracing::error!("Failed to execute query: {:?}", err);
                StoreError::Storage(err.to_string())
            }
        }
    }
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &Uuid) -> Result<models::User, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<models::User, StoreError>;

    /// Persist a fresh registration. An existing unverified record with the
    /// same email is replaced; a verified one is left alone and the call
    /// fails with `Conflict`.
    async fn upsert_unverified(&self, user: &models::User) -> Result<(), StoreError>;

    async fn set_refresh_token(&self, id: &Uuid, token: &str) -> Result<(), StoreError>;

    async fn mark_verified(&self, email: &str) -> Result<(), StoreError>;

    async fn set_password_hash(&self, email: &str, password_hash: &str)
        -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<models::User>, StoreError>;

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
pub trait LoanStore: Send + Sync {
    async fn insert(&self, loan: &models::Loan) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: &Uuid) -> Result<models::Loan, StoreError>;

    async fn list(&self) -> Result<Vec<models::Loan>, StoreError>;

    async fn update_status(&self, id: &Uuid, status: models::LoanStatus)
        -> Result<(), StoreError>;

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
pub trait LogStore: Send + Sync {
    async fn append(&self, entry: &models::LogEntry) -> Result<(), StoreError>;

    async fn list(&self) -> Result<Vec<models::LogEntry>, StoreError>;
}
