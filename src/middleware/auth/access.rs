//! access token 検証 → AuthCtx を extensions に入れる
//!
//! 1. ルートのポリシー解決 (handler / group のどちらかが anonymous ならスキップ)
//! 2. `Authorization: Bearer <token>` の抽出 (不正な形は「トークンなし」として扱う)
//! 3. codec で検証 (トークンなしでも同じ経路を通す)
//! 4. 失敗 → 401 `{"message": "Missing or invalid access token"}`、成功 → AuthCtx を格納

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::{MatchedPath, State},
    http::{HeaderMap, Method, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::middleware::auth::policy::{AuthPolicy, EndpointPolicies};
use crate::services::auth::{AccessTokenCodec, Identity, TokenValidation};

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Endpoint opts out of authentication; the token was not looked at.
    Skipped,
    Allowed(Identity),
    Rejected,
}

impl GateOutcome {
    /// `Skipped` and `Allowed` both let the handler run.
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

#[derive(Clone, Debug)]
pub struct AccessGate {
    codec: Arc<AccessTokenCodec>,
    policies: Arc<EndpointPolicies>,
}

impl AccessGate {
    pub fn new(codec: Arc<AccessTokenCodec>, policies: Arc<EndpointPolicies>) -> Self {
        Self { codec, policies }
    }

    pub fn authorize(
        &self,
        method: &Method,
        matched_path: Option<&str>,
        headers: &HeaderMap,
    ) -> GateOutcome {
        let meta = self.policies.lookup(method, matched_path);
        if meta.policy() == AuthPolicy::AllowAnonymous {
            return GateOutcome::Skipped;
        }

        match self.codec.verify(extract_bearer(headers)) {
            TokenValidation::Identity(identity) => GateOutcome::Allowed(identity),
            TokenValidation::Unauthenticated => GateOutcome::Rejected,
        }
    }
}

/// Token from the single `Authorization: Bearer <token>` header.
///
/// Missing, repeated, non-ASCII, blank or differently prefixed headers all give
/// `None`. The scheme is matched case-sensitively.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let mut values = headers.get_all(header::AUTHORIZATION).iter();
    let value = values.next()?;
    if values.next().is_some() {
        return None;
    }

    let token = value.to_str().ok()?.strip_prefix(BEARER_PREFIX)?;
    if token.trim().is_empty() {
        return None;
    }

    Some(token)
}

/// Put the gate in front of every route of `router`.
///
/// `Router::layer` runs after routing, so `MatchedPath` is available to the
/// middleware.
pub fn apply<S>(router: Router<S>, gate: AccessGate) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(gate, access_middleware))
}

async fn access_middleware(
    State(gate): State<AccessGate>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let matched_path = req.extensions().get::<MatchedPath>().map(|p| p.as_str());
    let outcome = gate.authorize(req.method(), matched_path, req.headers());

    match outcome {
        GateOutcome::Skipped => next.run(req).await,
        GateOutcome::Allowed(identity) => {
            // middleware → extractor への受け渡し
            req.extensions_mut().insert(AuthCtx::new(identity));
            next.run(req).await
        }
        GateOutcome::Rejected => {
            tracing::warn!(
                method = %req.method(),
                path = %req.uri().path(),
                "request rejected: missing or invalid access token"
            );
            AppError::MissingOrInvalidToken.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use chrono::{TimeDelta, Timelike, Utc};

    use super::*;
    use crate::middleware::auth::policy::{Endpoints, RouteGroup};
    use crate::services::auth::Claim;
    use crate::services::clock::SystemClock;

    const SECRET: &[u8] = b"gate-test-secret";

    async fn ok() -> &'static str {
        "ok"
    }

    fn gate() -> (AccessGate, Arc<AccessTokenCodec>) {
        let codec = Arc::new(AccessTokenCodec::new(SECRET, Arc::new(SystemClock)));
        let (_, policies) = Endpoints::<()>::new()
            .group(
                RouteGroup::new("/books")
                    .route("/", axum::routing::get(ok).post(ok))
                    .anonymous(Method::GET, "/"),
            )
            .group(
                RouteGroup::new("/public")
                    .allow_anonymous()
                    .route("/ping", axum::routing::get(ok)),
            )
            .into_parts();
        (AccessGate::new(codec.clone(), Arc::new(policies)), codec)
    }

    fn headers(values: &[&str]) -> HeaderMap {
        let mut h = HeaderMap::new();
        for v in values {
            h.append(header::AUTHORIZATION, HeaderValue::from_str(v).unwrap());
        }
        h
    }

    fn valid_token(codec: &AccessTokenCodec) -> String {
        let expires_at = (Utc::now() + TimeDelta::minutes(5))
            .with_nanosecond(0)
            .unwrap();
        codec
            .issue(Some(&[Claim::email("a@b.com")]), expires_at)
            .unwrap()
    }

    #[test]
    fn bearer_value_is_extracted() {
        assert_eq!(extract_bearer(&headers(&["Bearer abc123"])), Some("abc123"));
    }

    #[test]
    fn malformed_headers_extract_nothing() {
        let cases: &[&[&str]] = &[
            &[],
            &["abc123"],
            &["Bearer "],
            &["Bearer    "],
            &["bearer abc123"],
            &["BEARER abc123"],
            &["Basic YTpi"],
            &["Bearer a", "Bearer b"],
            &["Bearer a", "Bearer a"],
        ];
        for case in cases {
            assert_eq!(extract_bearer(&headers(case)), None, "{case:?}");
        }
    }

    #[test]
    fn non_visible_ascii_header_extracts_nothing() {
        let mut h = HeaderMap::new();
        h.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert_eq!(extract_bearer(&h), None);
    }

    #[test]
    fn anonymous_group_skips_even_with_garbage_token() {
        let (gate, _) = gate();
        for h in [headers(&[]), headers(&["Bearer garbage"]), headers(&["nonsense"])] {
            let outcome = gate.authorize(&Method::GET, Some("/public/ping"), &h);
            assert_eq!(outcome, GateOutcome::Skipped);
            assert!(outcome.is_allowed());
        }
    }

    #[test]
    fn anonymous_handler_skips_only_its_method() {
        let (gate, _) = gate();
        assert_eq!(
            gate.authorize(&Method::GET, Some("/books"), &headers(&[])),
            GateOutcome::Skipped
        );
        assert_eq!(
            gate.authorize(&Method::POST, Some("/books"), &headers(&[])),
            GateOutcome::Rejected
        );
    }

    #[test]
    fn protected_endpoint_rejects_missing_or_bad_tokens() {
        let (gate, codec) = gate();
        let token = valid_token(&codec);
        let bearer = format!("Bearer {token}");
        let cases = [
            headers(&[]),
            headers(&["Bearer garbage"]),
            headers(&[token.as_str()]),
            headers(&[bearer.as_str(), bearer.as_str()]),
        ];
        for h in cases {
            let outcome = gate.authorize(&Method::POST, Some("/books"), &h);
            assert_eq!(outcome, GateOutcome::Rejected);
            assert!(!outcome.is_allowed());
        }
    }

    #[test]
    fn protected_endpoint_allows_valid_token() {
        let (gate, codec) = gate();
        let bearer = format!("Bearer {}", valid_token(&codec));

        let outcome = gate.authorize(&Method::POST, Some("/books"), &headers(&[bearer.as_str()]));
        let GateOutcome::Allowed(identity) = outcome else {
            panic!("expected Allowed, got {outcome:?}");
        };
        assert_eq!(identity.email(), Some("a@b.com"));
    }

    #[test]
    fn unmatched_route_requires_auth() {
        let (gate, _) = gate();
        assert_eq!(
            gate.authorize(&Method::GET, None, &headers(&[])),
            GateOutcome::Rejected
        );
    }
}
