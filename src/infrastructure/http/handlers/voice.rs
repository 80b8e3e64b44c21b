//! Voice HTTP Handlers

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use std::sync::Arc;

use crate::application::{AddVoice, DeleteVoice, GetVoice, ListVoices};
use crate::domain::voice::VoiceSummary;
use crate::infrastructure::http::dto::{StatusMessage, VoiceListResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 获取音色列表
pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<VoiceListResponse> {
    let result = state.list_voices_handler.handle(ListVoices);

    Json(VoiceListResponse {
        voices: result.voices,
        count: result.count,
    })
}

/// 获取音色详情
pub async fn get_voice(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<VoiceSummary>, ApiError> {
    Ok(Json(state.get_voice_handler.handle(GetVoice { name })?))
}

/// 上传音色
///
/// multipart 字段：`voice_name`、`audio_file`、`reference_text`
pub async fn add_voice(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<StatusMessage>, ApiError> {
    let mut name: Option<String> = None;
    let mut reference_text: Option<String> = None;
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or_default().to_string();

        match field_name.as_str() {
            "voice_name" => {
                name = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read voice_name: {}", e))
                })?);
            }
            "reference_text" => {
                reference_text = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read reference_text: {}", e))
                })?);
            }
            "audio_file" => {
                audio = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| {
                            ApiError::BadRequest(format!("Failed to read audio_file: {}", e))
                        })?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let name = name.ok_or_else(|| ApiError::BadRequest("voice_name is required".to_string()))?;
    let audio = audio.ok_or_else(|| ApiError::BadRequest("audio_file is required".to_string()))?;
    let reference_text = reference_text
        .ok_or_else(|| ApiError::BadRequest("reference_text is required".to_string()))?;

    let result = state
        .add_voice_handler
        .handle(AddVoice {
            name,
            reference_text,
            audio,
        })
        .await?;

    Ok(Json(StatusMessage::success(format!(
        "Voice '{}' added successfully",
        result.name
    ))))
}

/// 删除音色
pub async fn delete_voice(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<StatusMessage>, ApiError> {
    let deleted = state.delete_voice_handler.handle(DeleteVoice { name }).await?;

    Ok(Json(StatusMessage::success(format!(
        "Voice '{}' deleted successfully",
        deleted
    ))))
}
