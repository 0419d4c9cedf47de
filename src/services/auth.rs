//! Registration, email verification, login, explicit refresh and password
//! reset flows on top of the token issuer and the user store.

use crate::connectors::{Mailer, MailerError};
use crate::db::{StoreError, UserStore};
use crate::helpers::{error_response, PasswordHasher};
use crate::models;
use crate::services::SessionStore;
use crate::token::{Claims, LinkPurpose, TokenError, TokenIssuer, TokenKind};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::Duration;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("a verified account with this email already exists")]
    DuplicateVerifiedUser,
    #[error("email address is not verified")]
    NotVerified,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid token: {0}")]
    InvalidToken(String),
    #[error("token expired")]
    ExpiredToken,
    #[error("refresh token was superseded, please login again")]
    StaleOrReusedToken,
    #[error("user not found")]
    UserNotFound,
    #[error("{0}")]
    Validation(String),
    #[error("storage failure")]
    Storage(String),
    #[error("link delivery failed")]
    Delivery(String),
    #[error("internal error")]
    Internal(String),
}

impl AuthError {
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::DuplicateVerifiedUser => "duplicate_verified_user",
            AuthError::NotVerified => "not_verified",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::ExpiredToken => "expired_token",
            AuthError::StaleOrReusedToken => "stale_or_reused_token",
            AuthError::UserNotFound => "user_not_found",
            AuthError::Validation(_) => "validation",
            AuthError::Storage(_) => "storage_error",
            AuthError::Delivery(_) => "delivery_failed",
            AuthError::Internal(_) => "internal_error",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AuthError::UserNotFound,
            StoreError::Conflict(_) => AuthError::DuplicateVerifiedUser,
            StoreError::Storage(msg) => AuthError::Storage(msg),
        }
    }
}

impl From<MailerError> for AuthError {
    fn from(err: MailerError) -> Self {
        AuthError::Delivery(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => AuthError::Internal(msg),
            TokenError::Invalid(msg) => AuthError::InvalidToken(msg),
            TokenError::Expired => AuthError::ExpiredToken,
        }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::DuplicateVerifiedUser => StatusCode::CONFLICT,
            AuthError::NotVerified => StatusCode::FORBIDDEN,
            AuthError::InvalidCredentials
            | AuthError::InvalidToken(_)
            | AuthError::ExpiredToken
            | AuthError::StaleOrReusedToken => StatusCode::UNAUTHORIZED,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::Delivery(_) => StatusCode::BAD_GATEWAY,
            AuthError::Storage(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), self.reason(), self.to_string())
    }
}

/// Tokens minted by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: SessionStore,
    issuer: TokenIssuer,
    hasher: Arc<dyn PasswordHasher>,
    mailer: Arc<dyn Mailer>,
    link_ttl: Duration,
    public_base_url: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        issuer: TokenIssuer,
        hasher: Arc<dyn PasswordHasher>,
        mailer: Arc<dyn Mailer>,
        link_ttl: Duration,
        public_base_url: String,
    ) -> Self {
        Self {
            sessions: SessionStore::new(users.clone()),
            users,
            issuer,
            hasher,
            mailer,
            link_ttl,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn link(&self, path: &str, token: &str) -> String {
        format!("{}{path}?token={token}", self.public_base_url)
    }

    /// Create an unverified account and send its verification link. An
    /// earlier registration that was never verified is replaced.
    #[tracing::instrument(name = "Register user", skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<models::PublicUser, AuthError> {
        match self.users.find_by_email(email).await {
            Ok(existing) if existing.is_verified => {
                return Err(AuthError::DuplicateVerifiedUser);
            }
            Ok(_) | Err(StoreError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }

        let password_hash = self.hasher.hash(password).map_err(AuthError::Internal)?;
        let user = models::User::new(username.to_string(), email.to_string(), password_hash);

        let token = self
            .issuer
            .codec()
            .encode_link(email, LinkPurpose::VerifyEmail, self.link_ttl)?;
        self.mailer
            .send_verification_link(email, &self.link("/users/verify-email", &token))
            .await?;

        // A concurrent registration may have been verified since the check above.
        self.users.upsert_unverified(&user).await.map_err(|err| {
            tracing::error!("Failed to save registration: {}", err);
            AuthError::from(err)
        })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(models::PublicUser::from(&user))
    }

    /// Mark the account named by a verification link as verified.
    #[tracing::instrument(name = "Verify email", skip(self, token))]
    pub async fn verify_email(&self, token: &str) -> Result<String, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Validation("Please provide a token".to_string()));
        }

        let email = self
            .issuer
            .codec()
            .decode_link(token, LinkPurpose::VerifyEmail)?;
        self.users.mark_verified(&email).await?;
        Ok(email)
    }

    /// Check credentials, then mint an access/refresh pair. The refresh
    /// token replaces whatever was stored for the user.
    #[tracing::instrument(name = "Login", skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let user = self.users.find_by_email(email).await.map_err(|err| match err {
            StoreError::NotFound => AuthError::InvalidCredentials,
            err => AuthError::from(err),
        })?;

        if !user.is_verified {
            return Err(AuthError::NotVerified);
        }

        if !self.hasher.verify(&user.password_hash, password) {
            return Err(AuthError::InvalidCredentials);
        }

        let user_id = user.id.to_string();
        let access_token = self
            .issuer
            .issue(&user_id, &user.email, TokenKind::Access)?;
        let refresh_token = self
            .issuer
            .issue(&user_id, &user.email, TokenKind::Refresh)?;

        self.sessions
            .set_refresh_token(&user.id, &refresh_token)
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(Session {
            access_token,
            refresh_token,
        })
    }

    /// Trade the stored refresh token for a new access token. The refresh
    /// token itself is not rotated; only login replaces it.
    #[tracing::instrument(name = "Refresh access token", skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims: Claims = self.issuer.codec().decode(refresh_token)?;
        if claims.is_expired() {
            return Err(AuthError::ExpiredToken);
        }

        let user_id = Uuid::parse_str(&claims.user_id)
            .map_err(|_| AuthError::InvalidToken("malformed subject".to_string()))?;
        let user = self.sessions.find_by_id(&user_id).await?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            tracing::warn!(user_id = %user.id, "Refresh token does not match the stored one");
            return Err(AuthError::StaleOrReusedToken);
        }

        let access_token =
            self.issuer
                .issue(&user.id.to_string(), &user.email, TokenKind::Access)?;
        Ok(access_token)
    }

    #[tracing::instrument(name = "Request password reset", skip(self))]
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let user = self.users.find_by_email(email).await?;

        let token = self.issuer.codec().encode_link(
            &user.email,
            LinkPurpose::PasswordReset,
            self.link_ttl,
        )?;
        self.mailer
            .send_password_reset_link(&user.email, &self.link("/users/password-reset", &token))
            .await?;
        Ok(())
    }

    /// Store a new password for the account named by a reset link.
    #[tracing::instrument(name = "Reset password", skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<String, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Validation("Please provide a token".to_string()));
        }

        let email = self
            .issuer
            .codec()
            .decode_link(token, LinkPurpose::PasswordReset)?;
        let password_hash = self
            .hasher
            .hash(new_password)
            .map_err(AuthError::Internal)?;
        self.users.set_password_hash(&email, &password_hash).await?;
        Ok(email)
    }

    pub async fn profile(&self, user_id: &str) -> Result<models::PublicUser, AuthError> {
        let id = parse_user_id(user_id)?;
        self.users
            .find_by_id(&id)
            .await
            .map(models::PublicUser::from)
            .map_err(AuthError::from)
    }

    pub async fn list_users(&self) -> Result<Vec<models::PublicUser>, AuthError> {
        Ok(self
            .users
            .list()
            .await?
            .into_iter()
            .map(models::PublicUser::from)
            .collect())
    }

    pub async fn delete_user(&self, user_id: &str) -> Result<(), AuthError> {
        let id = parse_user_id(user_id)?;
        self.users.delete(&id).await.map_err(AuthError::from)
    }
}

fn parse_user_id(user_id: &str) -> Result<Uuid, AuthError> {
    Uuid::parse_str(user_id).map_err(|_| AuthError::Validation("invalid user id".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::{MockMailer, SentMail};
    use crate::db::MemoryUserStore;
    use crate::helpers::Argon2Hasher;
    use crate::token::TokenCodec;

    struct Harness {
        users: Arc<MemoryUserStore>,
        mailer: Arc<MockMailer>,
        service: AuthService,
    }

    fn harness_with_mailer(mailer: MockMailer) -> Harness {
        let users = Arc::new(MemoryUserStore::new());
        let mailer = Arc::new(mailer);
        let issuer = TokenIssuer::new(
            Arc::new(TokenCodec::new(b"auth-secret")),
            Duration::minutes(15),
            Duration::days(7),
        );
        let service = AuthService::new(
            users.clone(),
            issuer,
            Arc::new(Argon2Hasher),
            mailer.clone(),
            Duration::hours(24),
            "http://localhost:8000/".to_string(),
        );
        Harness {
            users,
            mailer,
            service,
        }
    }

    fn harness() -> Harness {
        harness_with_mailer(MockMailer::new())
    }

    async fn registered_and_verified(h: &Harness) {
        h.service.register("alice", "a@x.com", "pw").await.unwrap();
        let token = h.mailer.last().unwrap().token().unwrap().to_string();
        h.service.verify_email(&token).await.unwrap();
    }

    #[tokio::test]
    async fn register_sends_verification_link() {
        let h = harness();
        let user = h.service.register("alice", "a@x.com", "pw").await.unwrap();
        assert!(!user.is_verified);
        assert!(!user.is_admin);

        match h.mailer.last().unwrap() {
            SentMail::Verification { email, link } => {
                assert_eq!(email, "a@x.com");
                assert!(link.starts_with("http://localhost:8000/users/verify-email?token="));
            }
            other => panic!("unexpected mail {other:?}"),
        }

        let stored = h.users.find_by_email("a@x.com").await.unwrap();
        assert_ne!(stored.password_hash, "pw");
        assert!(stored.refresh_token.is_none());
    }

    #[tokio::test]
    async fn unverified_duplicate_may_register_again() {
        let h = harness();
        let first = h.service.register("alice", "a@x.com", "pw").await.unwrap();
        let second = h.service.register("alice2", "a@x.com", "pw2").await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(h.users.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn verified_duplicate_is_rejected() {
        let h = harness();
        registered_and_verified(&h).await;
        assert_eq!(
            h.service.register("mallory", "a@x.com", "pw").await,
            Err(AuthError::DuplicateVerifiedUser)
        );
    }

    /// Hides existing accounts from the duplicate check, as if another
    /// registration for the same email was verified in between.
    struct LateVerifiedStore(MemoryUserStore);

    #[async_trait::async_trait]
    impl UserStore for LateVerifiedStore {
        async fn find_by_id(&self, id: &Uuid) -> Result<models::User, StoreError> {
            self.0.find_by_id(id).await
        }
        async fn find_by_email(&self, _email: &str) -> Result<models::User, StoreError> {
            Err(StoreError::NotFound)
        }
        async fn upsert_unverified(&self, user: &models::User) -> Result<(), StoreError> {
            self.0.upsert_unverified(user).await
        }
        async fn set_refresh_token(&self, id: &Uuid, token: &str) -> Result<(), StoreError> {
            self.0.set_refresh_token(id, token).await
        }
        async fn mark_verified(&self, email: &str) -> Result<(), StoreError> {
            self.0.mark_verified(email).await
        }
        async fn set_password_hash(&self, email: &str, hash: &str) -> Result<(), StoreError> {
            self.0.set_password_hash(email, hash).await
        }
        async fn list(&self) -> Result<Vec<models::User>, StoreError> {
            self.0.list().await
        }
        async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
            self.0.delete(id).await
        }
    }

    #[tokio::test]
    async fn registration_losing_the_race_is_a_duplicate() {
        let store = MemoryUserStore::new();
        let mut verified = models::User::new("alice".into(), "a@x.com".into(), "hash".into());
        verified.is_verified = true;
        store.put(verified.clone()).await;

        let service = AuthService::new(
            Arc::new(LateVerifiedStore(store)),
            TokenIssuer::new(
                Arc::new(TokenCodec::new(b"auth-secret")),
                Duration::minutes(15),
                Duration::days(7),
            ),
            Arc::new(Argon2Hasher),
            Arc::new(MockMailer::new()),
            Duration::hours(24),
            "http://localhost:8000".to_string(),
        );

        let result = service.register("mallory", "a@x.com", "pw").await;
        assert_eq!(result, Err(AuthError::DuplicateVerifiedUser));
        assert_eq!(
            result.unwrap_err().status_code(),
            StatusCode::CONFLICT
        );
    }

    #[tokio::test]
    async fn failed_delivery_persists_nothing() {
        let h = harness_with_mailer(MockMailer::failing());
        let result = h.service.register("alice", "a@x.com", "pw").await;
        assert!(matches!(result, Err(AuthError::Delivery(_))));
        assert_eq!(
            h.users.find_by_email("a@x.com").await,
            Err(StoreError::NotFound)
        );
    }

    #[tokio::test]
    async fn login_on_unverified_account_issues_nothing() {
        let h = harness();
        h.service.register("alice", "a@x.com", "pw").await.unwrap();

        assert_eq!(
            h.service.login("a@x.com", "pw").await,
            Err(AuthError::NotVerified)
        );
        let stored = h.users.find_by_email("a@x.com").await.unwrap();
        assert!(stored.refresh_token.is_none());
    }

    #[tokio::test]
    async fn login_with_wrong_password_or_unknown_email() {
        let h = harness();
        registered_and_verified(&h).await;
        assert_eq!(
            h.service.login("a@x.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            h.service.login("b@x.com", "pw").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn login_persists_refresh_token_and_refresh_returns_new_access_token() {
        let h = harness();
        registered_and_verified(&h).await;

        let session = h.service.login("a@x.com", "pw").await.unwrap();
        assert!(!session.access_token.is_empty());
        let stored = h.users.find_by_email("a@x.com").await.unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some(session.refresh_token.as_str()));

        let access = h.service.refresh(&session.refresh_token).await.unwrap();
        assert_ne!(access, session.access_token);

        let claims: Claims = h.service.issuer.codec().decode(&access).unwrap();
        assert_eq!(claims.user_id, stored.id.to_string());
        assert_eq!(claims.email, "a@x.com");
    }

    #[tokio::test]
    async fn superseded_refresh_token_is_stale() {
        let h = harness();
        registered_and_verified(&h).await;

        let first = h.service.login("a@x.com", "pw").await.unwrap();
        let second = h.service.login("a@x.com", "pw").await.unwrap();

        assert_eq!(
            h.service.refresh(&first.refresh_token).await,
            Err(AuthError::StaleOrReusedToken)
        );
        assert!(h.service.refresh(&second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn expired_refresh_token_is_rejected() {
        let h = harness();
        registered_and_verified(&h).await;
        let stored = h.users.find_by_email("a@x.com").await.unwrap();

        let expired = h
            .service
            .issuer
            .codec()
            .encode(&Claims::new(
                stored.id.to_string(),
                "a@x.com",
                chrono::Utc::now().timestamp() - 10,
            ))
            .unwrap();
        h.users.set_refresh_token(&stored.id, &expired).await.unwrap();

        assert_eq!(
            h.service.refresh(&expired).await,
            Err(AuthError::ExpiredToken)
        );
    }

    #[tokio::test]
    async fn forged_refresh_token_is_invalid() {
        let h = harness();
        assert!(matches!(
            h.service.refresh("not-a-token").await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn password_reset_round_trip() {
        let h = harness();
        registered_and_verified(&h).await;

        h.service.request_password_reset("a@x.com").await.unwrap();
        let mail = h.mailer.last().unwrap();
        assert!(matches!(mail, SentMail::PasswordReset { .. }));

        let email = h
            .service
            .reset_password(mail.token().unwrap(), "new-pw")
            .await
            .unwrap();
        assert_eq!(email, "a@x.com");

        assert_eq!(
            h.service.login("a@x.com", "pw").await,
            Err(AuthError::InvalidCredentials)
        );
        assert!(h.service.login("a@x.com", "new-pw").await.is_ok());
    }

    #[tokio::test]
    async fn verification_link_cannot_reset_password() {
        let h = harness();
        h.service.register("alice", "a@x.com", "pw").await.unwrap();
        let token = h.mailer.last().unwrap().token().unwrap().to_string();

        assert!(matches!(
            h.service.reset_password(&token, "new-pw").await,
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[tokio::test]
    async fn reset_request_for_unknown_email() {
        let h = harness();
        assert_eq!(
            h.service.request_password_reset("ghost@x.com").await,
            Err(AuthError::UserNotFound)
        );
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn admin_user_management() {
        let h = harness();
        registered_and_verified(&h).await;
        let users = h.service.list_users().await.unwrap();
        assert_eq!(users.len(), 1);

        let id = users[0].id.clone();
        assert_eq!(h.service.profile(&id).await.unwrap().email, "a@x.com");
        h.service.delete_user(&id).await.unwrap();
        assert_eq!(h.service.delete_user(&id).await, Err(AuthError::UserNotFound));
        assert!(matches!(
            h.service.profile("nope").await,
            Err(AuthError::Validation(_))
        ));
    }
}
