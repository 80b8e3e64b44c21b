//! Audio Encoder Port - 音频编码抽象
//!
//! 把 f32 采样编码为完整的音频容器。流式输出基于同一个编码器：
//! 第一帧带完整文件头，后续帧剥离文件头只保留采样字节

use std::sync::Arc;
use thiserror::Error;

/// 编码错误
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Encoded frame shorter than container header ({len} < {header_len})")]
    TruncatedFrame { len: usize, header_len: usize },
}

/// Audio Encoder Port
pub trait AudioEncoderPort: Send + Sync {
    /// 固定输出采样率
    fn sample_rate(&self) -> u32;

    /// MIME 类型
    fn content_type(&self) -> &'static str;

    /// 文件扩展名
    fn extension(&self) -> &'static str;

    /// 编码一段采样为完整的容器字节
    fn encode(&self, samples: &[f32]) -> Result<Vec<u8>, EncodeError>;

    /// 容器头长度（字节）
    ///
    /// 实现方在构造时用空采样编码一次得到，不允许硬编码
    fn header_len(&self) -> usize;
}

/// 流式分帧器
///
/// 每个采样块独立编码；第一帧原样输出，之后的帧去掉 `header_len` 字节的文件头，
/// 使得所有帧按顺序拼接后是一条连续可播放的音频流
pub struct FrameEncoder {
    encoder: Arc<dyn AudioEncoderPort>,
    header_sent: bool,
}

impl FrameEncoder {
    pub fn new(encoder: Arc<dyn AudioEncoderPort>) -> Self {
        Self {
            encoder,
            header_sent: false,
        }
    }

    /// 编码一个采样块，返回要发送的帧；无需发送时返回 None
    pub fn push(&mut self, samples: &[f32]) -> Result<Option<Vec<u8>>, EncodeError> {
        let encoded = self.encoder.encode(samples)?;

        if !self.header_sent {
            self.header_sent = true;
            return Ok(Some(encoded));
        }

        let header_len = self.encoder.header_len();
        if encoded.len() < header_len {
            return Err(EncodeError::TruncatedFrame {
                len: encoded.len(),
                header_len,
            });
        }
        if encoded.len() == header_len {
            return Ok(None);
        }
        Ok(Some(encoded[header_len..].to_vec()))
    }

    /// 是否已经发送过带文件头的第一帧
    pub fn header_sent(&self) -> bool {
        self.header_sent
    }
}
