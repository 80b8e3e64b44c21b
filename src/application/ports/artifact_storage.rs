//! Artifact Storage Port - 生成产物存储与保留策略

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::domain::synthesis::ArtifactId;

/// 产物存储错误
#[derive(Debug, Error)]
pub enum ArtifactStorageError {
    #[error("Artifact not found: {0}")]
    NotFound(String),

    #[error("Artifact storage I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ArtifactStorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// 保留策略执行结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionReport {
    /// 扫描到的产物数量
    pub scanned: usize,
    /// 删除的产物数量
    pub deleted: usize,
    /// 因正在下载而跳过的产物数量
    pub skipped_in_flight: usize,
}

/// 产物租约
///
/// 持有期间该产物不会被保留策略删除，drop 即释放
pub trait ArtifactLease: Send + Sync {}

/// 打开的产物（下载用）
pub struct OpenedArtifact {
    pub path: PathBuf,
    pub size: u64,
    pub lease: Box<dyn ArtifactLease>,
}

/// Artifact Storage Port
#[async_trait]
pub trait ArtifactStoragePort: Send + Sync {
    /// 原子发布：完整写入后才以最终文件名出现
    async fn publish(
        &self,
        id: ArtifactId,
        data: &[u8],
    ) -> Result<PathBuf, ArtifactStorageError>;

    /// 按文件名打开产物并持有租约
    async fn open(&self, file_name: &str) -> Result<OpenedArtifact, ArtifactStorageError>;

    /// 保留最新的 max_count 个产物，删除更旧的
    async fn enforce_limit(&self, max_count: usize) -> Result<RetentionReport, ArtifactStorageError>;
}
