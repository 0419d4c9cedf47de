use crate::db::{StoreError, UserStore};
use crate::models;
use std::sync::Arc;
use uuid::Uuid;

/// The two user-store operations a session needs: resolve the user behind
/// a token and replace their refresh token.
///
/// Nothing here serialises a read-then-write on the same user. Two
/// concurrent logins race in the store and the last write wins.
#[derive(Clone)]
pub struct SessionStore {
    users: Arc<dyn UserStore>,
}

impl SessionStore {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    #[tracing::instrument(name = "Resolve session user", skip(self))]
    pub async fn find_by_id(&self, id: &Uuid) -> Result<models::User, StoreError> {
        self.users.find_by_id(id).await
    }

    #[tracing::instrument(name = "Store refresh token", skip(self, token))]
    pub async fn set_refresh_token(&self, id: &Uuid, token: &str) -> Result<(), StoreError> {
        self.users.set_refresh_token(id, token).await
    }
}
