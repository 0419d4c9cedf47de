//! In-process stores. Each keeps its records behind a `tokio::sync::RwLock`
//! so every read/update of a single record is atomic, which is all the
//! session layer asks of its storage.

use super::{LoanStore, LogStore, StoreError, UserStore};
use crate::models;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, models::User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a record as is. Lets callers seed admins or
    /// pre-verified accounts that the public flows never create.
    pub async fn put(&self, user: models::User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<models::User, StoreError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<models::User, StoreError> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn upsert_unverified(&self, user: &models::User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let existing = users
            .values()
            .find(|stored| stored.email == user.email)
            .map(|stored| (stored.id, stored.is_verified));

        match existing {
            Some((_, true)) => {
                return Err(StoreError::Conflict(format!(
                    "verified account {} already exists",
                    user.email
                )))
            }
            Some((id, false)) => {
                users.remove(&id);
            }
            None => {}
        }

        let mut fresh = user.clone();
        fresh.is_admin = false;
        fresh.is_verified = false;
        fresh.refresh_token = None;
        users.insert(fresh.id, fresh);
        Ok(())
    }

    async fn set_refresh_token(&self, id: &Uuid, token: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users.get_mut(id).ok_or(StoreError::NotFound)?;
        user.refresh_token = Some(token.to_string());
        Ok(())
    }

    async fn mark_verified(&self, email: &str) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .values_mut()
            .find(|user| user.email == email)
            .ok_or(StoreError::NotFound)?;
        user.is_verified = true;
        Ok(())
    }

    async fn set_password_hash(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let user = users
            .values_mut()
            .find(|user| user.email == email)
            .ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<models::User>, StoreError> {
        let mut users: Vec<models::User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryLoanStore {
    loans: RwLock<HashMap<Uuid, models::Loan>>,
}

impl MemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl LoanStore for MemoryLoanStore {
    async fn insert(&self, loan: &models::Loan) -> Result<(), StoreError> {
        self.loans.write().await.insert(loan.id, loan.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<models::Loan, StoreError> {
        self.loans
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list(&self) -> Result<Vec<models::Loan>, StoreError> {
        let mut loans: Vec<models::Loan> = self.loans.read().await.values().cloned().collect();
        loans.sort_by_key(|loan| loan.created_at);
        Ok(loans)
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: models::LoanStatus,
    ) -> Result<(), StoreError> {
        let mut loans = self.loans.write().await;
        let loan = loans.get_mut(id).ok_or(StoreError::NotFound)?;
        loan.status = status;
        loan.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        self.loans
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Default)]
pub struct MemoryLogStore {
    entries: RwLock<Vec<models::LogEntry>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl LogStore for MemoryLogStore {
    async fn append(&self, entry: &models::LogEntry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<models::LogEntry>, StoreError> {
        Ok(self.entries.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> models::User {
        models::User::new("alice".to_string(), email.to_string(), "hash".to_string())
    }

    #[tokio::test]
    async fn unverified_registration_is_replaced() {
        let store = MemoryUserStore::new();
        let first = user("a@x.com");
        store.upsert_unverified(&first).await.unwrap();

        let second = user("a@x.com");
        store.upsert_unverified(&second).await.unwrap();

        assert_eq!(store.find_by_id(&first.id).await, Err(StoreError::NotFound));
        let found = store.find_by_email("a@x.com").await.unwrap();
        assert_eq!(found.id, second.id);
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn verified_registration_is_kept() {
        let store = MemoryUserStore::new();
        let first = user("a@x.com");
        store.upsert_unverified(&first).await.unwrap();
        store.mark_verified("a@x.com").await.unwrap();

        let result = store.upsert_unverified(&user("a@x.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
        assert_eq!(store.find_by_email("a@x.com").await.unwrap().id, first.id);
    }

    #[tokio::test]
    async fn refresh_token_is_overwritten() {
        let store = MemoryUserStore::new();
        let stored = user("a@x.com");
        store.put(stored.clone()).await;

        store.set_refresh_token(&stored.id, "first").await.unwrap();
        store.set_refresh_token(&stored.id, "second").await.unwrap();

        let found = store.find_by_id(&stored.id).await.unwrap();
        assert_eq!(found.refresh_token.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let store = MemoryUserStore::new();
        let id = Uuid::new_v4();
        assert_eq!(
            store.set_refresh_token(&id, "token").await,
            Err(StoreError::NotFound)
        );
        assert_eq!(store.delete(&id).await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn loan_status_update_touches_timestamp() {
        let store = MemoryLoanStore::new();
        let loan = models::Loan::new(Uuid::new_v4(), "car".to_string(), 100.0);
        store.insert(&loan).await.unwrap();

        store
            .update_status(&loan.id, models::LoanStatus::Approved)
            .await
            .unwrap();

        let found = store.find_by_id(&loan.id).await.unwrap();
        assert_eq!(found.status, models::LoanStatus::Approved);
        assert!(found.updated_at >= loan.updated_at);
    }
}
