//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use crate::application::{
    // Command handlers
    AddVoiceHandler, DeleteVoiceHandler, StreamSpeechHandler, SynthesisSettings,
    SynthesizeSpeechHandler,
    // Query handlers
    GetAudioHandler, GetVoiceHandler, ListVoicesHandler, ServiceStatusHandler,
    // Ports
    ArtifactStoragePort, AudioEncoderPort, TtsEnginePort, VoiceStorePort,
};

/// 应用状态
pub struct AppState {
    // ========== Command Handlers ==========
    pub add_voice_handler: AddVoiceHandler,
    pub delete_voice_handler: DeleteVoiceHandler,
    pub synthesize_handler: SynthesizeSpeechHandler,
    pub stream_handler: StreamSpeechHandler,

    // ========== Query Handlers ==========
    pub get_voice_handler: GetVoiceHandler,
    pub list_voices_handler: ListVoicesHandler,
    pub status_handler: ServiceStatusHandler,
    pub get_audio_handler: GetAudioHandler,

    /// 下载产物的 MIME 类型，与编码器一致
    pub audio_content_type: &'static str,

    // ========== URL ==========
    /// 显式配置的公开 Base URL
    pub base_url: Option<String>,
    /// 无 Host 头时的兜底 Base URL
    pub fallback_base_url: String,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        voice_store: Arc<dyn VoiceStorePort>,
        engine: Arc<dyn TtsEnginePort>,
        encoder: Arc<dyn AudioEncoderPort>,
        artifacts: Arc<dyn ArtifactStoragePort>,
        settings: SynthesisSettings,
        base_url: Option<String>,
        fallback_base_url: String,
    ) -> Self {
        Self {
            // Command handlers
            add_voice_handler: AddVoiceHandler::new(voice_store.clone(), engine.clone()),
            delete_voice_handler: DeleteVoiceHandler::new(voice_store.clone()),
            synthesize_handler: SynthesizeSpeechHandler::new(
                voice_store.clone(),
                engine.clone(),
                encoder.clone(),
                artifacts.clone(),
                settings.clone(),
            ),
            stream_handler: StreamSpeechHandler::new(
                voice_store.clone(),
                engine.clone(),
                encoder.clone(),
                settings.clone(),
            ),

            // Query handlers
            get_voice_handler: GetVoiceHandler::new(voice_store.clone()),
            list_voices_handler: ListVoicesHandler::new(voice_store.clone()),
            status_handler: ServiceStatusHandler::new(voice_store, engine, settings.default_voice),
            get_audio_handler: GetAudioHandler::new(artifacts),

            audio_content_type: encoder.content_type(),

            base_url: base_url
                .filter(|url| !url.trim().is_empty())
                .map(|url| url.trim_end_matches('/').to_string()),
            fallback_base_url,
        }
    }
}
