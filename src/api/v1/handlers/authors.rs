/*
 * Responsibility
 * - /author 系 handler (グループごと anonymous)
 */
use axum::{Json, extract::State};

use crate::{
    api::v1::{dto::authors::AuthorResponse, extractors::IdPath},
    error::AppError,
    state::AppState,
};

pub async fn get_author(
    State(state): State<AppState>,
    IdPath(author_id): IdPath,
) -> Result<Json<AuthorResponse>, AppError> {
    let row = state.catalog.get_author(author_id).await?;
    Ok(Json(row.into()))
}
