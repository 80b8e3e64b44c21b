//! Audio Handlers - 生成产物下载

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::GetAudioQuery;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 下载生成的音频
///
/// 响应体发送期间持有租约，保留策略不会删除该文件
pub async fn download_audio(
    State(state): State<Arc<AppState>>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let artifact = state
        .get_audio_handler
        .handle(GetAudioQuery {
            file_name: file_name.clone(),
        })
        .await?;

    let file = tokio::fs::File::open(&artifact.path)
        .await
        .map_err(|_| ApiError::NotFound(format!("Audio file '{}' not found", file_name)))?;

    // 租约随响应体流一起释放
    let lease = artifact.lease;
    let stream = async_stream::stream! {
        let _lease = lease;
        let mut reader = ReaderStream::new(file);
        while let Some(chunk) = reader.next().await {
            yield chunk;
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, state.audio_content_type)
        .header(header::CONTENT_LENGTH, artifact.size)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
