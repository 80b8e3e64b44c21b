//! Data Transfer Objects
//!
//! JSON 字段统一使用 camelCase

use serde::{Deserialize, Serialize};

use crate::domain::voice::VoiceSummary;

// ============================================================================
// 通用响应
// ============================================================================

/// 操作成功响应
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub status: &'static str,
    pub message: String,
}

impl StatusMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }
}

// ============================================================================
// Health DTOs
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `ok` 或 `initializing`
    pub status: &'static str,
    pub model: String,
    pub available_voices: Vec<String>,
    pub default_voice: String,
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoiceListResponse {
    pub voices: Vec<VoiceSummary>,
    pub count: usize,
}

// ============================================================================
// Synthesis DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SynthesizeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub voice: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesizeResponse {
    pub audio_url: String,
    pub duration_seconds: f64,
    pub voice: String,
    pub generation_time_seconds: f64,
}
