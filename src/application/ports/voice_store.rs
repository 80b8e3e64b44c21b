//! Voice Store Port - 音色参考仓储
//!
//! 内存索引 + 磁盘文件的写穿缓存：磁盘是权威来源，内存索引在启动时全量重建

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

use crate::domain::voice::{EncodedReference, ReferenceText, VoiceName, VoiceReference, VoiceSummary};

/// 音色仓储错误
#[derive(Debug, Error)]
pub enum VoiceStoreError {
    #[error("Voice '{0}' not found")]
    NotFound(String),

    #[error("Voice '{0}' already exists")]
    AlreadyExists(String),

    #[error("Voice storage I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for VoiceStoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// 新增音色
#[derive(Debug, Clone)]
pub struct NewVoice {
    pub name: VoiceName,
    pub encoded: EncodedReference,
    pub reference_text: ReferenceText,
    /// 已暂存的源音频（提交时被移动到最终位置）
    pub staged_audio: Option<PathBuf>,
}

/// 惰性、有限、可重复获取的摘要序列
pub type VoiceSummaries<'a> = Box<dyn Iterator<Item = VoiceSummary> + Send + 'a>;

/// Voice Store Port
#[async_trait]
pub trait VoiceStorePort: Send + Sync {
    /// 扫描存储目录并重建内存索引，返回加载数量
    async fn load_all(&self) -> Result<usize, VoiceStoreError>;

    /// 大小写不敏感查找，不修改状态
    fn get(&self, name: &VoiceName) -> Option<Arc<VoiceReference>>;

    /// 是否存在
    fn contains(&self, name: &VoiceName) -> bool {
        self.get(name).is_some()
    }

    /// 所有音色名
    fn names(&self) -> Vec<String>;

    /// 音色摘要序列
    fn list(&self) -> VoiceSummaries<'_>;

    /// 暂存上传的源音频，返回暂存路径
    async fn stage_audio(&self, name: &VoiceName, data: &[u8]) -> Result<PathBuf, VoiceStoreError>;

    /// 丢弃暂存文件
    async fn discard_staged(&self, staged: &std::path::Path);

    /// 新增音色：先落盘，再进入内存索引；失败时回滚本次写入的所有文件
    async fn add(&self, voice: NewVoice) -> Result<Arc<VoiceReference>, VoiceStoreError>;

    /// 删除音色的所有文件及内存条目
    async fn delete(&self, name: &VoiceName) -> Result<(), VoiceStoreError>;
}
