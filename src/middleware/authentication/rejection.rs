use crate::helpers::error_response;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

/// Why a gate refused a request. Every variant ends the request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("Authorization header must be of the form `Bearer <token>`")]
    MissingOrMalformedHeader,
    #[error("Invalid JWT")]
    InvalidToken,
    #[error("User not found")]
    UserNotFound,
    #[error("Database error")]
    StorageError,
    #[error("Invalid JWT claims")]
    ClaimMismatch,
    #[error("Access token expired and no refresh token on file")]
    ExpiredNoRefresh,
    #[error("Access token expired and could not be reissued")]
    RefreshFailed,
    #[error("Forbidden: You don't have admin privileges")]
    Forbidden,
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MissingOrMalformedHeader => "missing_or_malformed_header",
            Rejection::InvalidToken => "invalid_token",
            Rejection::UserNotFound => "user_not_found",
            Rejection::StorageError => "storage_error",
            Rejection::ClaimMismatch => "claim_mismatch",
            Rejection::ExpiredNoRefresh => "expired_no_refresh",
            Rejection::RefreshFailed => "refresh_failed",
            Rejection::Forbidden => "forbidden",
        }
    }
}

impl ResponseError for Rejection {
    fn status_code(&self) -> StatusCode {
        match self {
            Rejection::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
            Rejection::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), self.reason(), self.to_string())
    }
}
