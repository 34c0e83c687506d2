/*
 * Responsibility
 * - account (signup / login / me) の request/response DTO
 * - validate() は必須チェックのみ (形式チェックはしない)
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::auth::Claim;

pub const EMAIL_REQUIRED: &str = "Email is required";
pub const PASSWORD_REQUIRED: &str = "Password is required";

fn require(value: &str, message: &'static str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err(message);
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        require(&self.email, EMAIL_REQUIRED)?;
        require(&self.first_name, "First name is required")?;
        require(&self.last_name, "Last name is required")?;
        require(&self.password, PASSWORD_REQUIRED)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        require(&self.email, EMAIL_REQUIRED)?;
        require(&self.password, PASSWORD_REQUIRED)
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub email: Option<String>,
    pub claims: Vec<Claim>,
}
