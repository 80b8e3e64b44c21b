//! 应用层错误定义
//!
//! 统一的命令/查询错误类型，对应服务边界上的状态码语义

use thiserror::Error;

use crate::application::ports::{ArtifactStorageError, EncodeError, EngineError, VoiceStoreError};
use crate::domain::synthesis::SynthesisError;
use crate::domain::voice::VoiceError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到（未知音色、删除目标不存在）
    #[error("{0}")]
    NotFound(String),

    /// 参数无效（空文本、非法音色名）
    #[error("{0}")]
    InvalidArgument(String),

    /// 资源冲突（音色名重复）
    #[error("{0}")]
    Conflict(String),

    /// 推理引擎尚未就绪
    #[error("{0}")]
    Unavailable(String),

    /// 内部错误（引擎失败、I/O 失败）
    #[error("{0}")]
    Internal(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// 创建参数错误
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<SynthesisError> for ApplicationError {
    fn from(err: SynthesisError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<VoiceStoreError> for ApplicationError {
    fn from(err: VoiceStoreError) -> Self {
        match err {
            VoiceStoreError::NotFound(name) => Self::NotFound(format!("Voice '{}' not found", name)),
            VoiceStoreError::AlreadyExists(name) => {
                Self::Conflict(format!("Voice '{}' already exists", name))
            }
            VoiceStoreError::Io(msg) => Self::Internal(msg),
        }
    }
}

impl From<EngineError> for ApplicationError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotReady => Self::Unavailable("Model not initialized".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<EncodeError> for ApplicationError {
    fn from(err: EncodeError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ArtifactStorageError> for ApplicationError {
    fn from(err: ArtifactStorageError) -> Self {
        match err {
            ArtifactStorageError::NotFound(name) => {
                Self::NotFound(format!("Audio file '{}' not found", name))
            }
            ArtifactStorageError::Io(msg) => Self::Internal(msg),
        }
    }
}
