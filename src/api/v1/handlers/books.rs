/*
 * Responsibility
 * - /book 系 CRUD handler (認証必須グループ)
 * - Path/Json を extractor で受け、DTO validation → CatalogService 呼び出し
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::books::{BookRequest, BookResponse, IdResponse},
        extractors::{ApiJson, IdPath},
    },
    error::AppError,
    state::AppState,
};

pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BookRequest>,
) -> Result<(StatusCode, Json<IdResponse>), AppError> {
    let input = req.validate().map_err(AppError::bad_request)?;
    let row = state.catalog.create_book(input).await?;

    Ok((StatusCode::CREATED, Json(IdResponse { id: row.id })))
}

pub async fn update_book(
    State(state): State<AppState>,
    IdPath(book_id): IdPath,
    ApiJson(req): ApiJson<BookRequest>,
) -> Result<Json<BookResponse>, AppError> {
    let input = req.validate().map_err(AppError::bad_request)?;
    let row = state.catalog.update_book(book_id, input).await?;

    Ok(Json(row.into()))
}

pub async fn get_book(
    State(state): State<AppState>,
    IdPath(book_id): IdPath,
) -> Result<Json<BookResponse>, AppError> {
    let row = state.catalog.get_book(book_id).await?;
    Ok(Json(row.into()))
}

pub async fn delete_book(
    State(state): State<AppState>,
    IdPath(book_id): IdPath,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_book(book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
