mod admin;
mod apply;
mod get;

pub use admin::*;
pub use apply::*;
pub use get::*;

use crate::db::StoreError;
use crate::helpers::error_response;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoanError {
    #[error("loan not found")]
    NotFound,
    #[error("this loan belongs to another user")]
    Forbidden,
    #[error("{0}")]
    Validation(String),
    #[error("storage failure")]
    Storage(String),
}

impl LoanError {
    pub fn reason(&self) -> &'static str {
        match self {
            LoanError::NotFound => "not_found",
            LoanError::Forbidden => "forbidden",
            LoanError::Validation(_) => "validation",
            LoanError::Storage(_) => "storage_error",
        }
    }
}

impl From<StoreError> for LoanError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => LoanError::NotFound,
            StoreError::Conflict(msg) | StoreError::Storage(msg) => LoanError::Storage(msg),
        }
    }
}

impl ResponseError for LoanError {
    fn status_code(&self) -> StatusCode {
        match self {
            LoanError::NotFound => StatusCode::NOT_FOUND,
            LoanError::Forbidden => StatusCode::FORBIDDEN,
            LoanError::Validation(_) => StatusCode::BAD_REQUEST,
            LoanError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        error_response(self.status_code(), self.reason(), self.to_string())
    }
}
