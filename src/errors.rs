use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::{
    repository::user_repository::UserStoreError,
    services::{object_storage::StorageError, token_service::TokenError},
    usecase::user_usecase::UserError,
};

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    /// Shortcut for 400 Bad Request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    /// Shortcut for 401 Unauthorized
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<UserStoreError> for AppError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::EmailTaken(_) => AppError::new(StatusCode::CONFLICT, err.to_string()),
            other => {
                tracing::error!("User store failure: {}", other);
                AppError::internal("internal server error")
            }
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => AppError::unauthorized(err.to_string()),
            TokenError::SigningFailed => AppError::internal(err.to_string()),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AlreadyExistsElsewhere(_) | StorageError::AlreadyOwned(_) => {
                AppError::new(StatusCode::CONFLICT, err.to_string())
            }
            StorageError::NoSuchBucket(_) => AppError::not_found("bucket not found"),
            other => {
                tracing::error!("Object storage failure: {}", other);
                AppError::internal("object storage request failed")
            }
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Store(err) => err.into(),
            UserError::Token(err) => err.into(),
            UserError::BucketProvisioning { .. } => {
                tracing::error!("{}", err);
                AppError::internal("user created but bucket provisioning failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_statuses() {
        let cases = [
            (StorageError::NoSuchBucket(String::new()), StatusCode::NOT_FOUND),
            (StorageError::AlreadyExistsElsewhere("b".into()), StatusCode::CONFLICT),
            (StorageError::Upstream("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).status, status);
        }
    }

    #[test]
    fn upstream_details_are_not_leaked() {
        let err = AppError::from(StorageError::Upstream("AccessDenied: arn:aws:iam::123".into()));
        assert!(!err.message.contains("arn"));
    }

    #[test]
    fn invalid_token_is_unauthorized() {
        assert_eq!(
            AppError::from(TokenError::InvalidToken).status,
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn duplicate_email_is_conflict() {
        let err = AppError::from(UserError::Store(UserStoreError::EmailTaken("a@b.c".into())));
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
