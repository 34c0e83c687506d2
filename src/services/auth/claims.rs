/*
 * Responsibility
 * - token に載せる Claim と、検証結果 (TokenValidation / Identity) の型
 * - jsonwebtoken / axum には依存しない (値の型だけ)
 */
use serde::Serialize;

/// Well-known claim types issued by this service.
pub mod claim_types {
    pub const EMAIL: &str = "email";
}

/// A typed fact about a principal, carried inside an access token.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    pub fn email(value: impl Into<String>) -> Self {
        Self::new(claim_types::EMAIL, value)
    }
}

/// Claims recovered from a token that passed signature and expiry checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    claims: Vec<Claim>,
}

impl Identity {
    pub fn new(claims: Vec<Claim>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// First value of the given claim type, if any.
    pub fn find(&self, claim_type: &str) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type)
            .map(|c| c.value.as_str())
    }

    pub fn email(&self) -> Option<&str> {
        self.find(claim_types::EMAIL)
    }
}

/// Outcome of access-token verification.
///
/// Verification is total: malformed, unsigned, tampered and expired tokens all
/// end up as `Unauthenticated`, which carries no cause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidation {
    Identity(Identity),
    Unauthenticated,
}

impl TokenValidation {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Identity(_))
    }

    /// Empty for `Unauthenticated`.
    pub fn claims(&self) -> &[Claim] {
        match self {
            Self::Identity(identity) => identity.claims(),
            Self::Unauthenticated => &[],
        }
    }

    pub fn into_identity(self) -> Option<Identity> {
        match self {
            Self::Identity(identity) => Some(identity),
            Self::Unauthenticated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_has_no_claims() {
        let v = TokenValidation::Unauthenticated;
        assert!(!v.is_authenticated());
        assert!(v.claims().is_empty());
        assert!(v.into_identity().is_none());
    }

    #[test]
    fn identity_finds_first_claim_of_type() {
        let identity = Identity::new(vec![
            Claim::new("role", "reader"),
            Claim::email("a@b.com"),
            Claim::email("other@b.com"),
        ]);

        assert_eq!(identity.email(), Some("a@b.com"));
        assert_eq!(identity.find("role"), Some("reader"));
        assert_eq!(identity.find("missing"), None);

        let v = TokenValidation::Identity(identity);
        assert!(v.is_authenticated());
        assert_eq!(v.claims().len(), 3);
    }

    #[test]
    fn claim_serializes_with_type_field() {
        let json = serde_json::to_value(Claim::email("a@b.com")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "email", "value": "a@b.com"}));
    }
}
