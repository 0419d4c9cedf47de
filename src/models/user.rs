use serde::Serialize;
use uuid::Uuid;

/// Stored user record.
///
/// `refresh_token` holds the single outstanding refresh token; `None` means
/// no session was ever opened. Issuing a new one overwrites the previous.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_verified: bool,
    pub refresh_token: Option<String>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            is_admin: false,
            is_verified: false,
            refresh_token: None,
        }
    }

    /// The refresh token on file; an empty value counts as none.
    pub fn stored_refresh_token(&self) -> Option<&str> {
        self.refresh_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

/// What a user may see about an account.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub is_verified: bool,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            is_verified: user.is_verified,
        }
    }
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser::from(&user)
    }
}
