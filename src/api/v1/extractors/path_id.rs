/*
 * Responsibility
 * - Path の `{id}` を i64 として受ける
 * - 数値でなければ 400 (axum のプレーンテキストではなく AppError で返す)
 */
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!(error = %rejection.body_text(), "path id rejected");
                AppError::bad_request("Id must be an integer")
            })?;
        Ok(Self(id))
    }
}
