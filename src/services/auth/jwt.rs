use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::services::auth::claims::{Claim, Identity, TokenValidation};
use crate::services::clock::Clock;

const EXP: &str = "exp";
const IAT: &str = "iat";
const RESERVED: [&str; 2] = [EXP, IAT];

/// Errors surfaced to internal callers of [`AccessTokenCodec::issue`].
#[derive(Debug, thiserror::Error)]
pub enum TokenCodecError {
    #[error("claims are required")]
    MissingClaims,
    #[error("claim type '{0}' is reserved")]
    ReservedClaimType(String),
    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
    #[error("token expiry {0} is not a whole second")]
    SubSecondExpiry(DateTime<Utc>),
    #[error("failed to sign access token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),
}

/// Why a token was refused. Only logged; callers see `Unauthenticated`.
#[derive(Debug, thiserror::Error)]
enum VerifyError {
    #[error("token is not a readable jwt: {0}")]
    Malformed(#[source] jsonwebtoken::errors::Error),
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("missing or non-integer 'exp' claim")]
    MissingExpiry,
    #[error("token expired at {exp} (now {now})")]
    Expired { exp: i64, now: i64 },
}

/// HS256 access-token codec.
///
/// Holds only immutable key material, so a single instance is shared by every
/// request through `Arc`. Expiry is judged against the injected [`Clock`],
/// not against jsonwebtoken's own system-time check.
#[derive(Clone)]
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for AccessTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("AccessTokenCodec")
            .field("validation", &self.validation)
            .finish()
    }
}

impl AccessTokenCodec {
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&[EXP]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            clock,
        }
    }

    /// Sign `claims` into a compact JWT that expires at `expires_at`.
    ///
    /// `None` is an argument error; an empty slice yields a token with only
    /// `exp`/`iat`. A claim type repeated in `claims` is written as a JSON array.
    ///
    /// `exp` is carried in whole seconds, so `expires_at` must not have a
    /// fractional part; otherwise the token would die before `expires_at`.
    pub fn issue(
        &self,
        claims: Option<&[Claim]>,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenCodecError> {
        let claims = claims.ok_or(TokenCodecError::MissingClaims)?;
        if expires_at.timestamp_subsec_nanos() != 0 {
            return Err(TokenCodecError::SubSecondExpiry(expires_at));
        }

        let mut payload = Map::new();
        for claim in claims {
            if RESERVED.contains(&claim.claim_type.as_str()) {
                return Err(TokenCodecError::ReservedClaimType(claim.claim_type.clone()));
            }
            let value = Value::String(claim.value.clone());
            match payload.get_mut(&claim.claim_type) {
                None => {
                    payload.insert(claim.claim_type.clone(), value);
                }
                Some(Value::Array(values)) => values.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            }
        }
        payload.insert(IAT.to_string(), Value::from(self.clock.now().timestamp()));
        payload.insert(EXP.to_string(), Value::from(expires_at.timestamp()));

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &payload, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign access token");
            TokenCodecError::Sign(e)
        })
    }

    /// Verify a bearer token. Never fails: any problem yields `Unauthenticated`.
    ///
    /// `None` goes through the same path as an unreadable token.
    pub fn verify(&self, token: Option<&str>) -> TokenValidation {
        match self.try_verify(token.unwrap_or_default()) {
            Ok(identity) => TokenValidation::Identity(identity),
            Err(err) => {
                debug!(error = %err, "access token rejected");
                TokenValidation::Unauthenticated
            }
        }
    }

    fn try_verify(&self, token: &str) -> Result<Identity, VerifyError> {
        // (1) structure, before any key is involved
        jsonwebtoken::decode_header(token).map_err(VerifyError::Malformed)?;

        // (2) signature + algorithm + presence of `exp`
        let data =
            jsonwebtoken::decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)?;
        let payload = data.claims;

        // (3) expiry against our clock, no leeway
        let exp = payload
            .get(EXP)
            .and_then(Value::as_i64)
            .ok_or(VerifyError::MissingExpiry)?;
        let now = self.clock.now().timestamp();
        if exp <= now {
            return Err(VerifyError::Expired { exp, now });
        }

        Ok(Identity::new(claims_from_payload(payload)))
    }
}

fn claims_from_payload(payload: Map<String, Value>) -> Vec<Claim> {
    let mut claims = Vec::new();
    for (claim_type, value) in payload {
        if RESERVED.contains(&claim_type.as_str()) {
            continue;
        }
        match value {
            Value::Array(values) => {
                claims.extend(
                    values
                        .into_iter()
                        .filter_map(scalar_text)
                        .map(|v| Claim::new(claim_type.clone(), v)),
                );
            }
            other => {
                if let Some(v) = scalar_text(other) {
                    claims.push(Claim::new(claim_type, v));
                }
            }
        }
    }
    claims
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
