//! HTTP-level middleware applied to every route, including the gate's 401s.
//!
//! - Request-Id generation + propagation (`x-request-id`), recorded on the trace span
//! - Access logging (TraceLayer)
//! - Body size limit and global timeout from [`HttpSettings`]
//!
//! Failures raised by these layers answer with the same `{"message": ...}` body
//! as handler errors.

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Method, Request, Uri, header::HeaderName};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::config::HttpSettings;
use crate::error::AppError;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn apply(router: Router, settings: &HttpSettings) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let layers = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(handle_layer_error))
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        .layer(TimeoutLayer::new(settings.request_timeout))
        .layer(TraceLayer::new_for_http().make_span_with(request_span));

    router.layer(layers)
}

async fn handle_layer_error(method: Method, uri: Uri, err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!(%method, %uri, "request timed out");
        AppError::RequestTimeout
    } else {
        tracing::error!(%method, %uri, error = %err, "unhandled middleware error");
        AppError::Internal
    }
}

// SetRequestIdLayer runs first, so the header is always there
fn request_span<B>(req: &Request<B>) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri(),
        request_id = %request_id,
    )
}
