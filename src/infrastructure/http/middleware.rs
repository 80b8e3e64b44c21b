//! HTTP Middleware
//!
//! 按状态码分级的请求日志

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// 状态码错误日志中间件
///
/// 4xx 记 warn，5xx 记 error。流式响应只计到响应头发出为止
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            latency_ms,
            "HTTP client error"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        routing::post,
        Router,
    };
    use tower::util::ServiceExt;

    fn router_with_status(status: StatusCode) -> Router {
        Router::new()
            .route("/synthesize", post(move || async move { status }))
            .layer(axum::middleware::from_fn(error_logging_middleware))
    }

    #[tokio::test]
    async fn test_status_passes_through_unchanged() {
        for status in [
            StatusCode::OK,
            StatusCode::BAD_REQUEST,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            let request = HttpRequest::builder()
                .method("POST")
                .uri("/synthesize")
                .body(Body::empty())
                .unwrap();

            let response = router_with_status(status).oneshot(request).await.unwrap();
            assert_eq!(response.status(), status);
        }
    }
}
