//! HTTP Error Handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: u16,
    pub error: String,
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const CONFLICT: u16 = 409;
    pub const INTERNAL_ERROR: u16 = 500;
    pub const SERVICE_UNAVAILABLE: u16 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
    /// 重名等冲突；HTTP 状态为 400，errno 为 409
    Conflict(String),
    ServiceUnavailable(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, u16, &str) {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, errno::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, errno::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, errno::INTERNAL_ERROR, msg)
            }
            ApiError::Conflict(msg) => (StatusCode::BAD_REQUEST, errno::CONFLICT, msg),
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                errno::SERVICE_UNAVAILABLE,
                msg,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errno, msg) = self.parts();

        if status.is_server_error() {
            tracing::error!(errno, error = %msg, "Request failed");
        } else {
            tracing::warn!(errno, error = %msg, "Request rejected");
        }

        let body = ErrorResponse {
            errno,
            error: msg.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound(msg) => ApiError::NotFound(msg),
            ApplicationError::InvalidArgument(msg) => ApiError::BadRequest(msg),
            ApplicationError::Conflict(msg) => ApiError::Conflict(msg),
            ApplicationError::Unavailable(msg) => ApiError::ServiceUnavailable(msg),
            ApplicationError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApplicationError::not_found("x"), StatusCode::NOT_FOUND),
            (ApplicationError::invalid_argument("x"), StatusCode::BAD_REQUEST),
            (ApplicationError::Conflict("x".into()), StatusCode::BAD_REQUEST),
            (ApplicationError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ApplicationError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_conflict_keeps_distinct_errno() {
        let (status, code, _) = ApiError::Conflict("dup".into()).parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, errno::CONFLICT);
    }
}
