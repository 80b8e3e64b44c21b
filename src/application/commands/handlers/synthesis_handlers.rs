//! Synthesis Command Handlers
//!
//! 合成编排：解析音色 → 驱动推理引擎 → 组装整文件产物或实时帧流

use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::application::commands::{StreamSpeech, SynthesizeSpeech};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    ArtifactStoragePort, AudioEncoderPort, EngineError, FrameEncoder, InferRequest,
    TtsEnginePort, VoiceStorePort,
};
use crate::domain::synthesis::{ArtifactId, GeneratedArtifact, SynthesisText};
use crate::domain::voice::{VoiceName, VoiceReference};

/// 日志中文本预览的最大字符数
const TEXT_PREVIEW_CHARS: usize = 50;

/// 合成公共配置
#[derive(Debug, Clone)]
pub struct SynthesisSettings {
    /// 未指定音色时使用的默认音色
    pub default_voice: String,
    /// 输出目录最多保留的产物数量
    pub max_output_files: usize,
    /// 整文件合成超时，None 表示不限制
    pub timeout: Option<Duration>,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            default_voice: "dave".to_string(),
            max_output_files: 100,
            timeout: None,
        }
    }
}

/// 通过校验的合成请求
struct PreparedSynthesis {
    text: SynthesisText,
    voice: Arc<VoiceReference>,
}

impl PreparedSynthesis {
    fn infer_request(&self) -> InferRequest {
        InferRequest {
            text: self.text.as_str().to_string(),
            encoded_reference: self.voice.encoded().clone(),
            reference_text: self.voice.reference_text().clone(),
            voice: self.voice.name().clone(),
        }
    }
}

/// 校验顺序：引擎就绪 → 文本非空 → 音色存在。全部通过前不触碰引擎
fn prepare(
    engine: &dyn TtsEnginePort,
    voice_store: &dyn VoiceStorePort,
    settings: &SynthesisSettings,
    text: String,
    voice: Option<String>,
) -> Result<PreparedSynthesis, ApplicationError> {
    if !engine.is_ready() {
        return Err(EngineError::NotReady.into());
    }

    let text = SynthesisText::parse(text)?;

    let requested = voice
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| settings.default_voice.clone());
    let voice = VoiceName::parse(&requested)
        .ok()
        .and_then(|name| voice_store.get(&name))
        .ok_or_else(|| {
            ApplicationError::not_found(format!(
                "Voice '{}' not found. Available: {:?}",
                requested,
                voice_store.names()
            ))
        })?;

    Ok(PreparedSynthesis { text, voice })
}

// ============================================================================
// SynthesizeSpeech
// ============================================================================

/// 整文件合成响应
#[derive(Debug, Clone)]
pub struct SynthesizeSpeechResponse {
    pub artifact: GeneratedArtifact,
    pub voice: String,
    /// 音频时长（秒）
    pub duration_secs: f64,
    /// 总耗时（秒）
    pub elapsed_secs: f64,
}

/// SynthesizeSpeech Handler
pub struct SynthesizeSpeechHandler {
    voice_store: Arc<dyn VoiceStorePort>,
    engine: Arc<dyn TtsEnginePort>,
    encoder: Arc<dyn AudioEncoderPort>,
    artifacts: Arc<dyn ArtifactStoragePort>,
    settings: SynthesisSettings,
}

impl SynthesizeSpeechHandler {
    pub fn new(
        voice_store: Arc<dyn VoiceStorePort>,
        engine: Arc<dyn TtsEnginePort>,
        encoder: Arc<dyn AudioEncoderPort>,
        artifacts: Arc<dyn ArtifactStoragePort>,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            voice_store,
            engine,
            encoder,
            artifacts,
            settings,
        }
    }

    pub async fn handle(
        &self,
        command: SynthesizeSpeech,
    ) -> Result<SynthesizeSpeechResponse, ApplicationError> {
        let prepared = prepare(
            self.engine.as_ref(),
            self.voice_store.as_ref(),
            &self.settings,
            command.text,
            command.voice,
        )?;
        let voice = prepared.voice.name().to_string();

        let start = Instant::now();
        tracing::info!(
            voice = %voice,
            text = %prepared.text.preview(TEXT_PREVIEW_CHARS),
            "Synthesizing"
        );

        let collect = self.collect_samples(prepared.infer_request());
        let samples = match self.settings.timeout {
            Some(limit) => tokio::time::timeout(limit, collect).await.map_err(|_| {
                ApplicationError::internal(format!("Synthesis timed out after {:?}", limit))
            })??,
            None => collect.await?,
        };

        let encoded = self.encoder.encode(&samples)?;
        let id = ArtifactId::new();
        let path = self.artifacts.publish(id, &encoded).await?;
        let artifact = GeneratedArtifact::new(id, path, self.encoder.sample_rate(), samples.len());

        // 保留策略是尽力而为的，失败不影响本次请求
        match self.artifacts.enforce_limit(self.settings.max_output_files).await {
            Ok(report) if report.deleted > 0 => {
                tracing::debug!(
                    deleted = report.deleted,
                    skipped_in_flight = report.skipped_in_flight,
                    "Old artifacts evicted"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Retention sweep failed"),
        }

        let elapsed_secs = start.elapsed().as_secs_f64();
        let duration_secs = artifact.duration_secs();

        tracing::info!(
            voice = %voice,
            artifact = %artifact.id(),
            samples = artifact.sample_count(),
            duration_secs,
            elapsed_secs,
            "Synthesis completed"
        );

        Ok(SynthesizeSpeechResponse {
            artifact,
            voice,
            duration_secs,
            elapsed_secs,
        })
    }

    /// 拉取完整的采样块序列并按产生顺序拼接
    async fn collect_samples(&self, request: InferRequest) -> Result<Vec<f32>, ApplicationError> {
        let voice = request.voice.clone();
        let mut chunks = self.engine.infer_stream(request).await?;
        let mut samples = Vec::new();

        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(chunk) => samples.extend_from_slice(&chunk),
                Err(e) => {
                    tracing::error!(voice = %voice, error = %e, "Engine failed during synthesis");
                    return Err(e.into());
                }
            }
        }

        Ok(samples)
    }
}

// ============================================================================
// StreamSpeech
// ============================================================================

/// 音频帧流
pub type AudioFrameStream = BoxStream<'static, Result<Vec<u8>, ApplicationError>>;

/// 流式合成响应
pub struct StreamSpeechResponse {
    pub voice: String,
    pub content_type: &'static str,
    /// 容器文件扩展名，用于下载文件名
    pub extension: &'static str,
    pub frames: AudioFrameStream,
}

/// StreamSpeech Handler
pub struct StreamSpeechHandler {
    voice_store: Arc<dyn VoiceStorePort>,
    engine: Arc<dyn TtsEnginePort>,
    encoder: Arc<dyn AudioEncoderPort>,
    settings: SynthesisSettings,
}

impl StreamSpeechHandler {
    pub fn new(
        voice_store: Arc<dyn VoiceStorePort>,
        engine: Arc<dyn TtsEnginePort>,
        encoder: Arc<dyn AudioEncoderPort>,
        settings: SynthesisSettings,
    ) -> Self {
        Self {
            voice_store,
            engine,
            encoder,
            settings,
        }
    }

    /// 校验并启动推理；返回的帧流在调用方拉取时才推进，drop 即取消
    pub async fn handle(&self, command: StreamSpeech) -> Result<StreamSpeechResponse, ApplicationError> {
        let prepared = prepare(
            self.engine.as_ref(),
            self.voice_store.as_ref(),
            &self.settings,
            command.text,
            command.voice,
        )?;
        let voice = prepared.voice.name().to_string();

        let start = Instant::now();
        tracing::info!(
            voice = %voice,
            text = %prepared.text.preview(TEXT_PREVIEW_CHARS),
            "Streaming synthesis"
        );

        let mut chunks = self.engine.infer_stream(prepared.infer_request()).await?;
        let mut framer = FrameEncoder::new(self.encoder.clone());
        let log_voice = voice.clone();

        let frames = async_stream::try_stream! {
            let mut frame_count = 0usize;

            while let Some(chunk) = chunks.next().await {
                let chunk = chunk.map_err(|e| {
                    tracing::error!(voice = %log_voice, error = %e, "Streaming error");
                    ApplicationError::from(e)
                })?;

                let frame = framer.push(&chunk).map_err(|e| {
                    tracing::error!(voice = %log_voice, error = %e, "Streaming error");
                    ApplicationError::from(e)
                })?;

                if let Some(frame) = frame {
                    if frame_count == 0 {
                        tracing::info!(
                            voice = %log_voice,
                            ttfb_ms = start.elapsed().as_millis() as u64,
                            "First chunk"
                        );
                    }
                    frame_count += 1;
                    yield frame;
                }
            }

            // 引擎没有产出任何采样块时，仍给客户端一个合法的空文件头
            if !framer.header_sent() {
                if let Some(frame) = framer.push(&[]).map_err(ApplicationError::from)? {
                    yield frame;
                }
            }

            tracing::info!(
                voice = %log_voice,
                frames = frame_count,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Streaming completed"
            );
        };

        Ok(StreamSpeechResponse {
            voice,
            content_type: self.encoder.content_type(),
            extension: self.encoder.extension(),
            frames: frames.boxed(),
        })
    }
}
