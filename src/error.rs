/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON body {"message": ...})
 * - repo / token のエラーを統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::TokenCodecError;
use crate::services::password::PasswordError;

pub const MISSING_OR_INVALID_TOKEN: &str = "Missing or invalid access token";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Email or password mismatch")]
    CredentialMismatch,
    // The gate never says which check failed.
    #[error("{}", MISSING_OR_INVALID_TOKEN)]
    MissingOrInvalidToken,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Request Timeout")]
    RequestTimeout,
    #[error("Payload Too Large")]
    PayloadTooLarge,
    #[error("Internal Server Error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::CredentialMismatch | AppError::MissingOrInvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = MessageResponse {
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::conflict("conflict"),
        }
    }
}

impl From<TokenCodecError> for AppError {
    fn from(e: TokenCodecError) -> Self {
        // Issuance failures are server-side (config / programming) errors
        tracing::error!(error = %e, "access token issuance failed");
        AppError::Internal
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        tracing::error!(error = %e, "password hashing failed");
        AppError::Internal
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unauthorized_body_is_fixed() {
        let (status, body) = body_json(AppError::MissingOrInvalidToken).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({"message": MISSING_OR_INVALID_TOKEN}));
    }

    #[tokio::test]
    async fn statuses_follow_the_variant() {
        let cases = [
            (AppError::bad_request("Email is required"), StatusCode::BAD_REQUEST),
            (AppError::CredentialMismatch, StatusCode::UNAUTHORIZED),
            (AppError::not_found("Book with id 7 was not found"), StatusCode::NOT_FOUND),
            (AppError::conflict("taken"), StatusCode::CONFLICT),
            (AppError::RequestTimeout, StatusCode::REQUEST_TIMEOUT),
            (AppError::PayloadTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
            (AppError::Internal, StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            let message = err.to_string();
            let (status, body) = body_json(err).await;
            assert_eq!(status, expected);
            assert_eq!(body["message"], message);
        }
    }
}
