/*
 * Responsibility
 * - サインアップ (ユーザー作成) とログイン (資格情報の照合 → access token 発行)
 * - 入力の必須チェックは DTO 側、ここでは業務ルールのみ
 * - bcrypt は CPU を占有するので spawn_blocking で回す
 */
use std::sync::Arc;

use tokio::task;
use tracing::{error, info};

use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::repos::user_repo::{NewUser, UserRepo, UserRow};
use crate::services::auth::{AccessTokenIssuer, IssuedAccessToken, Principal};
use crate::services::password;

const EMAIL_EXISTS: &str = "User with the same email already exists";

#[derive(Debug, Clone)]
pub struct SignUp {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepo>,
    issuer: Arc<AccessTokenIssuer>,
    password_cost: u32,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepo>, issuer: Arc<AccessTokenIssuer>, password_cost: u32) -> Self {
        Self {
            users,
            issuer,
            password_cost,
        }
    }

    pub async fn sign_up(&self, req: SignUp) -> Result<UserRow, AppError> {
        let cost = self.password_cost;
        let plain = req.password;
        let password_hash = task::spawn_blocking(move || password::hash_password(&plain, cost))
            .await
            .map_err(join_failed)??;

        let new_user = NewUser {
            email: req.email.trim().to_lowercase(),
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        };

        let row = self.users.create(new_user).await.map_err(|e| match e {
            RepoError::Conflict => AppError::conflict(EMAIL_EXISTS),
        })?;

        info!(user_id = %row.id, "user signed up");
        Ok(row)
    }

    /// Check email + password and issue a fresh access token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn log_in(&self, email: &str, password: &str) -> Result<IssuedAccessToken, AppError> {
        let Some(user) = self.users.get_by_email(email.trim()).await? else {
            return Err(AppError::CredentialMismatch);
        };

        let stored = user.password_hash.clone();
        let plain = password.to_string();
        let matches = task::spawn_blocking(move || password::verify_password(&stored, &plain))
            .await
            .map_err(join_failed)?;
        if !matches {
            return Err(AppError::CredentialMismatch);
        }

        let principal = Principal {
            user_id: user.id,
            email: user.email,
        };
        let issued = self.issuer.issue_for(&principal)?;

        info!(user_id = %principal.user_id, "user logged in");
        Ok(issued)
    }
}

fn join_failed(e: task::JoinError) -> AppError {
    error!(error = %e, "password task did not complete");
    AppError::Internal
}
