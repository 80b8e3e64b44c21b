//! HTTP TTS Client - 调用外部推理服务
//!
//! 实现 TtsEnginePort trait，通过 HTTP 调用独立部署的推理服务
//!
//! 外部推理 API:
//! GET  {base_url}/health                 2xx 表示模型已加载
//! POST {base_url}/encode_reference       multipart: audio → 编码字节
//! POST {base_url}/infer_stream           multipart: text, ref_text, ref_codes
//!      → 分块响应体，每帧为 `u32 LE 采样数` + 对应数量的 `f32 LE` 采样

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

use crate::application::ports::{EngineError, InferRequest, SampleChunkStream, TtsEnginePort};
use crate::domain::voice::EncodedReference;

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// 推理服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
    /// 模型描述
    pub model: String,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 300,
            model: "remote".to_string(),
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// HTTP TTS 客户端
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, EngineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EngineError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_form(&self, path: &str, form: Form) -> Result<reqwest::Response, EngineError> {
        let response = self
            .client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }
        Ok(response)
    }
}

fn map_reqwest_error(e: reqwest::Error) -> EngineError {
    if e.is_timeout() {
        EngineError::Timeout
    } else if e.is_connect() {
        EngineError::NetworkError(format!("Cannot connect to TTS service: {}", e))
    } else {
        EngineError::NetworkError(e.to_string())
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn encode_reference(&self, audio_path: &Path) -> Result<EncodedReference, EngineError> {
        let audio = tokio::fs::read(audio_path)
            .await
            .map_err(|e| EngineError::ReferenceAudio(e.to_string()))?;

        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reference.wav".to_string());
        let form = Form::new().part("audio", Part::bytes(audio).file_name(file_name));

        let response = self.post_form("encode_reference", form).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::InvalidResponse(format!("Failed to read codes: {}", e)))?;

        if bytes.is_empty() {
            return Err(EngineError::InvalidResponse("empty reference encoding".to_string()));
        }

        tracing::debug!(size = bytes.len(), "Reference encoded by remote engine");
        Ok(EncodedReference::new(bytes.to_vec()))
    }

    async fn infer_stream(&self, request: InferRequest) -> Result<SampleChunkStream, EngineError> {
        tracing::debug!(
            url = %self.url("infer_stream"),
            voice = %request.voice,
            text_len = request.text.len(),
            "Sending TTS infer request"
        );

        let form = Form::new()
            .text("text", request.text)
            .text("ref_text", request.reference_text.as_str().to_string())
            .part(
                "ref_codes",
                Part::bytes(request.encoded_reference.as_bytes().to_vec()),
            );

        let response = self.post_form("infer_stream", form).await?;
        let mut body = response.bytes_stream();

        let stream = async_stream::try_stream! {
            let mut decoder = FrameDecoder::default();
            while let Some(bytes) = body.next().await {
                let bytes = bytes.map_err(map_reqwest_error)?;
                decoder.extend(&bytes);
                while let Some(samples) = decoder.next_frame() {
                    yield samples;
                }
            }
            decoder.finish()?;
        };

        Ok(stream.boxed())
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.url("health"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    fn model_name(&self) -> String {
        self.config.model.clone()
    }
}

/// 增量帧解码器
///
/// 网络分块边界与帧边界无关，未凑齐的字节留在缓冲区等待下一块
#[derive(Debug, Default)]
struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    const LEN_PREFIX: usize = 4;

    fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn next_frame(&mut self) -> Option<Vec<f32>> {
        if self.buf.len() < Self::LEN_PREFIX {
            return None;
        }
        let count = u32::from_le_bytes([self.buf[0], self.buf[1], self.buf[2], self.buf[3]]) as usize;
        let frame_len = Self::LEN_PREFIX + count * 4;
        if self.buf.len() < frame_len {
            return None;
        }

        let samples = self.buf[Self::LEN_PREFIX..frame_len]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        self.buf.drain(..frame_len);
        Some(samples)
    }

    fn finish(&self) -> Result<(), EngineError> {
        if self.buf.is_empty() {
            Ok(())
        } else {
            Err(EngineError::InvalidResponse(format!(
                "truncated frame: {} trailing bytes",
                self.buf.len()
            )))
        }
    }
}
