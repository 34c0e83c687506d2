/*
 * Responsibility
 * - Json<T> の rejection (壊れた JSON / Content-Type 違い / サイズ超過) を AppError に寄せる
 * - これで全エラーの body が {"message": ...} にそろう
 */
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Drop-in replacement for `axum::Json` as a request extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;
        Ok(Self(value))
    }
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    tracing::debug!(status = %rejection.status(), error = %rejection.body_text(), "json body rejected");

    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    AppError::bad_request(rejection.body_text())
}
