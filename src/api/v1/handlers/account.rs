/*
 * Responsibility
 * - /account 系 handler (signup / login / me)
 * - DTO validation → AccountService 呼び出し → DTO に詰め替え
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::{
        dto::account::{LoginRequest, MeResponse, SignUpRequest, TokenResponse, UserResponse},
        extractors::{ApiJson, AuthCtxExtractor},
    },
    error::AppError,
    services::account::SignUp,
    state::AppState,
};

pub async fn sign_up(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignUpRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let row = state
        .accounts
        .sign_up(SignUp {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
        }),
    ))
}

pub async fn log_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    req.validate().map_err(AppError::bad_request)?;

    let issued = state.accounts.log_in(&req.email, &req.password).await?;

    Ok(Json(TokenResponse {
        access_token: issued.access_token,
        token_type: "Bearer",
        expires_in: issued.expires_in,
    }))
}

pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<MeResponse> {
    Json(MeResponse {
        email: ctx.email().map(str::to_string),
        claims: ctx.claims().to_vec(),
    })
}
