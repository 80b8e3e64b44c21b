//! Synthesis HTTP Handlers

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;

use crate::application::{StreamSpeech, SynthesizeSpeech};
use crate::infrastructure::http::dto::{SynthesizeRequest, SynthesizeResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 反向代理转发的原始协议头
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// 请求协议：只认 X-Forwarded-Proto 的第一个值，且只接受 http/https
fn request_scheme(headers: &HeaderMap) -> &'static str {
    let forwarded = headers
        .get(X_FORWARDED_PROTO)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_ascii_lowercase());
    match forwarded.as_deref() {
        Some("https") => "https",
        _ => "http",
    }
}

/// 拼接 audioUrl 的 Base URL：配置值 → 请求 Host 头 → 兜底值
fn base_url(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(base) = &state.base_url {
        return base.clone();
    }
    headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .filter(|h| !h.is_empty())
        .map(|host| format!("{}://{}", request_scheme(headers), host))
        .unwrap_or_else(|| state.fallback_base_url.clone())
}

/// 整文件合成
pub async fn synthesize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> Result<Json<SynthesizeResponse>, ApiError> {
    let Json(req) = payload?;

    let result = state
        .synthesize_handler
        .handle(SynthesizeSpeech {
            text: req.text,
            voice: req.voice,
        })
        .await?;

    Ok(Json(SynthesizeResponse {
        audio_url: format!("{}/audio/{}", base_url(&state, &headers), result.artifact.file_name()),
        duration_seconds: result.duration_secs,
        voice: result.voice,
        generation_time_seconds: result.elapsed_secs,
    }))
}

/// 流式合成
///
/// 第一帧带 WAV 文件头，之后只有采样字节；中途失败直接中断响应体
pub async fn synthesize_stream(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SynthesizeRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;

    let result = state
        .stream_handler
        .handle(StreamSpeech {
            text: req.text,
            voice: req.voice,
        })
        .await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}_stream.{}\"", result.voice, result.extension),
        )
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(result.frames))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_scheme_follows_forwarded_proto() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_scheme(&headers), "http");

        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("HTTPS, http"));
        assert_eq!(request_scheme(&headers), "https");

        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("gopher"));
        assert_eq!(request_scheme(&headers), "http");
    }
}
