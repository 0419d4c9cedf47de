use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Which lifetime a session token gets. The kind is not written into the
/// token; a caller knows what it asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    /// Absolute expiry, seconds since epoch.
    pub exp: i64,
    pub iat: i64,
    /// Unique per issuance so two tokens minted in the same second differ.
    pub jti: String,
}

impl Claims {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, exp: i64) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            exp,
            iat: Utc::now().timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp < now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkPurpose {
    VerifyEmail,
    PasswordReset,
}

/// Claims carried by the tokens embedded in emailed links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkClaims {
    pub email: String,
    pub purpose: LinkPurpose,
    pub exp: i64,
}
