//! Fake TTS Engine - 用于开发和测试的推理引擎
//!
//! 不加载任何模型，按文本长度生成确定性的正弦波采样块

use async_trait::async_trait;
use futures_util::StreamExt;
use std::path::Path;
use std::time::Duration;

use crate::application::ports::{EngineError, InferRequest, SampleChunkStream, TtsEnginePort};
use crate::domain::voice::EncodedReference;

/// Fake TTS Engine 配置
#[derive(Debug, Clone)]
pub struct FakeTtsEngineConfig {
    /// 采样率
    pub sample_rate: u32,
    /// 每个字符生成的采样数
    pub samples_per_char: usize,
    /// 每个采样块的最大采样数
    pub chunk_samples: usize,
    /// 每个采样块之间的模拟推理延迟（毫秒）
    pub chunk_delay_ms: u64,
}

impl Default for FakeTtsEngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000,
            samples_per_char: 1200,
            chunk_samples: 4800,
            chunk_delay_ms: 0,
        }
    }
}

/// Fake TTS Engine
pub struct FakeTtsEngine {
    config: FakeTtsEngineConfig,
}

impl FakeTtsEngine {
    pub fn new(config: FakeTtsEngineConfig) -> Self {
        tracing::info!(
            sample_rate = config.sample_rate,
            samples_per_char = config.samples_per_char,
            "FakeTtsEngine initialized"
        );
        Self { config }
    }

    fn render(&self, text: &str) -> Vec<Vec<f32>> {
        let total = text.chars().count() * self.config.samples_per_char;
        let chunk = self.config.chunk_samples.max(1);
        let step = 2.0 * std::f32::consts::PI * 220.0 / self.config.sample_rate as f32;

        let samples: Vec<f32> = (0..total).map(|i| (i as f32 * step).sin() * 0.3).collect();
        samples.chunks(chunk).map(|c| c.to_vec()).collect()
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsEngine {
    async fn encode_reference(&self, audio_path: &Path) -> Result<EncodedReference, EngineError> {
        let audio = tokio::fs::read(audio_path)
            .await
            .map_err(|e| EngineError::ReferenceAudio(e.to_string()))?;
        if audio.is_empty() {
            return Err(EngineError::ReferenceAudio("reference audio is empty".to_string()));
        }
        Ok(EncodedReference::new(audio))
    }

    async fn infer_stream(&self, request: InferRequest) -> Result<SampleChunkStream, EngineError> {
        tracing::debug!(
            voice = %request.voice,
            text_len = request.text.len(),
            "FakeTtsEngine: generating tone"
        );

        let chunks = self.render(&request.text);
        let delay = Duration::from_millis(self.config.chunk_delay_ms);

        let stream = futures_util::stream::iter(chunks).then(move |chunk| async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            Ok::<_, EngineError>(chunk)
        });
        Ok(stream.boxed())
    }

    fn model_name(&self) -> String {
        "fake-tone".to_string()
    }
}
