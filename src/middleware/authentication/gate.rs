use super::{extract_bearer_token, Rejection};
use crate::db::StoreError;
use crate::models::Identity;
use crate::services::SessionStore;
use crate::token::{Claims, TokenIssuer, TokenKind};
use chrono::Utc;
use uuid::Uuid;

/// Response header carrying an access token minted while serving the
/// current request.
pub const NEW_ACCESS_TOKEN_HEADER: &str = "new-access-token";

/// Outcome of an admitted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub identity: Identity,
    /// Set when the presented access token had expired and a fresh one
    /// was issued for the client to adopt.
    pub refreshed_token: Option<String>,
}

/// Bearer token verification for protected routes.
///
/// The steps run in a fixed order and the first failure wins:
/// header shape, signature, user lookup, email cross-check, expiry.
/// An expired token does not block the request. If the user has a live
/// refresh token on file a new access token is minted from the stored record
/// and the request is served under the identity it already proved. A stored
/// refresh token that is unreadable or past its own expiry ends the session.
pub struct AuthGate {
    issuer: TokenIssuer,
    sessions: SessionStore,
}

impl AuthGate {
    pub fn new(issuer: TokenIssuer, sessions: SessionStore) -> Self {
        Self { issuer, sessions }
    }

    pub async fn admit(&self, authorization: Option<&str>) -> Result<Admission, Rejection> {
        self.admit_at(authorization, Utc::now().timestamp()).await
    }

    #[tracing::instrument(name = "Auth gate", skip(self, authorization))]
    pub async fn admit_at(
        &self,
        authorization: Option<&str>,
        now: i64,
    ) -> Result<Admission, Rejection> {
        let token = authorization
            .and_then(extract_bearer_token)
            .ok_or(Rejection::MissingOrMalformedHeader)?;

        let claims: Claims = self.issuer.codec().decode(token).map_err(|err| {
            tracing::debug!("JWT parsing failed: {}", err);
            Rejection::InvalidToken
        })?;

        let user_id = Uuid::parse_str(&claims.user_id).map_err(|_| {
            tracing::debug!("JWT subject is not a user id");
            Rejection::InvalidToken
        })?;

        let user = self
            .sessions
            .find_by_id(&user_id)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => Rejection::UserNotFound,
                err => {
                    tracing::error!("User lookup failed: {}", err);
                    Rejection::StorageError
                }
            })?;

        if user.email != claims.email {
            tracing::warn!(user_id = %user.id, "JWT email does not match the stored user");
            return Err(Rejection::ClaimMismatch);
        }

        let refreshed_token = if claims.is_expired_at(now) {
            let stored = user
                .stored_refresh_token()
                .ok_or(Rejection::ExpiredNoRefresh)?;

            let refresh_claims: Claims = self.issuer.codec().decode(stored).map_err(|err| {
                tracing::warn!(user_id = %user.id, "Stored refresh token is unreadable: {}", err);
                Rejection::RefreshFailed
            })?;
            if refresh_claims.is_expired_at(now) {
                tracing::info!(user_id = %user.id, "Stored refresh token has expired");
                return Err(Rejection::RefreshFailed);
            }

            let token = self
                .issuer
                .issue(&user.id.to_string(), &user.email, TokenKind::Access)
                .map_err(|err| {
                    tracing::error!("Access token reissue failed: {}", err);
                    Rejection::RefreshFailed
                })?;
            tracing::info!(user_id = %user.id, "Expired access token rolled forward");
            Some(token)
        } else {
            None
        };

        Ok(Admission {
            identity: Identity {
                user_id: user.id.to_string(),
                is_admin: user.is_admin,
            },
            refreshed_token,
        })
    }
}
