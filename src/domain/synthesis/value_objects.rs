//! Synthesis Context - Value Objects

use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::SynthesisError;

/// 待合成文本
///
/// 不变量: 去除首尾空白后非空
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisText(String);

impl SynthesisText {
    pub fn parse(raw: impl Into<String>) -> Result<Self, SynthesisError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SynthesisError::EmptyText);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 日志用的截断预览
    pub fn preview(&self, max_chars: usize) -> String {
        let mut preview: String = self.0.chars().take(max_chars).collect();
        if self.0.chars().count() > max_chars {
            preview.push_str("...");
        }
        preview
    }
}

/// 生成产物 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// 从文件名解析，例如 `3f0c...e1.wav`
    pub fn from_file_name(file_name: &str, extension: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(extension)?.strip_suffix('.')?;
        Uuid::try_parse(stem).ok().map(Self)
    }

    pub fn file_name(&self, extension: &str) -> String {
        format!("{}.{}", self.0.simple(), extension)
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// 整文件合成的产物
///
/// 响应发出后没有任何实体再引用它，只会被保留策略删除
#[derive(Debug, Clone)]
pub struct GeneratedArtifact {
    id: ArtifactId,
    path: PathBuf,
    sample_rate: u32,
    sample_count: usize,
}

impl GeneratedArtifact {
    pub fn new(id: ArtifactId, path: PathBuf, sample_rate: u32, sample_count: usize) -> Self {
        Self {
            id,
            path,
            sample_rate,
            sample_count,
        }
    }

    pub fn id(&self) -> ArtifactId {
        self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// 时长（秒）= 采样数 / 采样率
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.sample_count as f64 / self.sample_rate as f64
    }
}
