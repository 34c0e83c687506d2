use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use uuid::Uuid;

use crate::services::auth::claims::Claim;
use crate::services::auth::jwt::{AccessTokenCodec, TokenCodecError};
use crate::services::clock::Clock;

/// An authenticated user on whose behalf tokens are issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    /// Seconds until expiry.
    pub expires_in: u64,
}

/// Turns an authenticated principal into a signed access token.
///
/// The validity window is applied here and nowhere else.
#[derive(Clone)]
pub struct AccessTokenIssuer {
    codec: Arc<AccessTokenCodec>,
    clock: Arc<dyn Clock>,
    validity: TimeDelta,
}

impl std::fmt::Debug for AccessTokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokenIssuer")
            .field("codec", &self.codec)
            .field("validity", &self.validity)
            .finish()
    }
}

impl AccessTokenIssuer {
    pub fn new(codec: Arc<AccessTokenCodec>, clock: Arc<dyn Clock>, validity: TimeDelta) -> Self {
        Self {
            codec,
            clock,
            validity,
        }
    }

    /// `expires_at` is `now + validity` truncated to the whole second, which is
    /// exactly what the token's `exp` carries.
    pub fn issue_for(&self, principal: &Principal) -> Result<IssuedAccessToken, TokenCodecError> {
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(self.validity)
            .and_then(|at| at.with_nanosecond(0))
            .ok_or(TokenCodecError::ExpiryOutOfRange)?;

        let claims = [Claim::email(principal.email.clone())];
        let access_token = self.codec.issue(Some(claims.as_slice()), expires_at)?;

        tracing::debug!(user_id = %principal.user_id, %expires_at, "access token issued");

        Ok(IssuedAccessToken {
            access_token,
            expires_at,
            expires_in: (expires_at - now).num_seconds().max(0) as u64,
        })
    }
}
