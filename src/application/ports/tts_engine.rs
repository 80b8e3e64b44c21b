//! TTS Engine Port - 推理引擎抽象
//!
//! 推理引擎把 (文本, 参考编码, 参考文本) 映射为一个惰性的音频采样块序列。
//! 具体实现在 infrastructure/adapters 层，串行化包装在 infrastructure/worker 层

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use std::path::Path;
use thiserror::Error;

use crate::domain::voice::{EncodedReference, ReferenceText, VoiceName};

/// 推理引擎错误
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model not initialized")]
    NotReady,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Engine error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to read reference audio: {0}")]
    ReferenceAudio(String),

    #[error("Engine worker stopped")]
    WorkerStopped,
}

/// 单次推理请求
#[derive(Debug, Clone)]
pub struct InferRequest {
    /// 要合成的文本
    pub text: String,
    /// 参考音频编码
    pub encoded_reference: EncodedReference,
    /// 参考音频对应文本
    pub reference_text: ReferenceText,
    /// 音色名（用于日志）
    pub voice: VoiceName,
}

/// 采样块序列：按产生顺序的 f32 单声道采样，出错即终止
pub type SampleChunkStream = BoxStream<'static, Result<Vec<f32>, EngineError>>;

/// TTS Engine Port
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 对参考音频做一次性编码
    async fn encode_reference(&self, audio_path: &Path) -> Result<EncodedReference, EngineError>;

    /// 开始一次分块推理
    ///
    /// 调用方不再拉取（drop 掉 stream）即视为取消
    async fn infer_stream(&self, request: InferRequest) -> Result<SampleChunkStream, EngineError>;

    /// 检查引擎是否可用
    async fn health_check(&self) -> bool {
        true
    }

    /// 引擎是否已完成初始化
    fn is_ready(&self) -> bool {
        true
    }

    /// 模型描述（健康检查接口展示）
    fn model_name(&self) -> String;
}
