/**
 * Routes Module
 * HTTP adapters over the vault's call surface
 */
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::store::error::VaultError;

pub mod auth;
pub mod comments;
pub mod health;
pub mod notifications;
pub mod rss;
pub mod settings;
pub mod upload;
pub mod works;

/// Error body shared by every handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }
}

/// Success body for delete-style endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Map a core error kind to the status its route answers with.
pub(crate) fn error_status(err: &VaultError) -> StatusCode {
    match err {
        VaultError::NotFound(_) | VaultError::EmailNotFound => StatusCode::NOT_FOUND,
        VaultError::DuplicateEmail => StatusCode::CONFLICT,
        VaultError::UserNotFound | VaultError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        VaultError::Validation(_) => StatusCode::BAD_REQUEST,
        VaultError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Status plus JSON error body for a failed core call.
pub(crate) fn error_reply(err: &VaultError) -> (StatusCode, Json<ErrorResponse>) {
    (error_status(err), Json(ErrorResponse::new(err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds_map_to_expected_statuses() {
        assert_eq!(
            error_status(&VaultError::NotFound("work")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&VaultError::DuplicateEmail),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&VaultError::NotAuthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            error_status(&VaultError::Validation("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&VaultError::Storage("io".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
