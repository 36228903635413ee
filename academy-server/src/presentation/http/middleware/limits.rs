use std::time::Duration;

use axum::{BoxError, Json, Router, error_handling::HandleErrorLayer, extract::DefaultBodyLimit};
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower::limit::GlobalConcurrencyLimitLayer;

use crate::presentation::http::app_error::ErrorBody;

#[derive(Debug, Clone, Copy)]
pub(crate) struct HttpLimits {
    pub(crate) body_limit_bytes: usize,
    pub(crate) concurrency_limit: usize,
    pub(crate) request_timeout: Duration,
}

async fn handle_overload(err: BoxError) -> (StatusCode, Json<ErrorBody>) {
    if err.is::<tower::timeout::error::Elapsed>() {
        return (
            StatusCode::REQUEST_TIMEOUT,
            Json(ErrorBody {
                error: "request timed out".to_string(),
            }),
        );
    }

    tracing::error!(error = %err, "unhandled middleware error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "internal error".to_string(),
        }),
    )
}

/// Multipart bodies carry whole images, so axum's 2 MB default is replaced
/// with the configured limit. The limit is enforced by the extractors, so an
/// oversized form surfaces as a multipart error and gets the JSON 400 of its
/// route. The concurrency limit is shared by every route.
pub(crate) fn apply_limits(router: Router, limits: HttpLimits) -> Router {
    router
        .layer(DefaultBodyLimit::max(limits.body_limit_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_overload))
                .layer(GlobalConcurrencyLimitLayer::new(limits.concurrency_limit))
                .timeout(limits.request_timeout),
        )
}
