//! File Artifact Storage - 文件系统产物存储实现
//!
//! 实现 ArtifactStoragePort trait：
//! - 发布先写 `.part` 临时文件，再 rename 为最终文件名
//! - 下载期间持有租约，保留策略跳过被租用的文件

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::fs;

use crate::application::ports::{
    ArtifactLease, ArtifactStorageError, ArtifactStoragePort, OpenedArtifact, RetentionReport,
};
use crate::domain::synthesis::ArtifactId;

type LeaseTable = Arc<DashMap<String, usize>>;

/// 租约表中的特殊计数：该文件正在被保留策略删除
const EVICTING: usize = usize::MAX;

/// 文件系统产物存储
pub struct FileArtifactStorage {
    /// 存储根目录
    base_dir: PathBuf,
    extension: String,
    /// 文件名 → 活跃租约数
    leases: LeaseTable,
}

impl FileArtifactStorage {
    /// 创建新的文件存储
    pub async fn new(
        base_dir: impl AsRef<Path>,
        extension: impl Into<String>,
    ) -> Result<Self, ArtifactStorageError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        // 确保目录存在
        fs::create_dir_all(&base_dir).await?;

        Ok(Self {
            base_dir,
            extension: extension.into(),
            leases: Arc::new(DashMap::new()),
        })
    }

    /// 获取租约；文件正在被删除时返回 None
    fn try_acquire(&self, file_name: &str) -> Option<FileLease> {
        let mut count = self.leases.entry(file_name.to_string()).or_insert(0);
        if *count == EVICTING {
            return None;
        }
        *count += 1;
        drop(count);

        Some(FileLease {
            leases: self.leases.clone(),
            file_name: file_name.to_string(),
        })
    }

    /// 在租约表中占位，占位期间 open 拿不到租约
    ///
    /// 检查与占位在同一个 entry 锁内完成；已有租约时返回 false
    fn claim_for_eviction(&self, file_name: &str) -> bool {
        match self.leases.entry(file_name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(EVICTING);
                true
            }
        }
    }

    fn release_claim(&self, file_name: &str) {
        self.leases.remove_if(file_name, |_, count| *count == EVICTING);
    }

    /// 列出所有产物及其修改时间
    async fn scan(&self) -> Result<Vec<(SystemTime, String)>, ArtifactStorageError> {
        let mut found = Vec::new();
        let mut entries = fs::read_dir(&self.base_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != self.extension.as_str()) {
                continue;
            }
            let metadata = match entry.metadata().await {
                Ok(m) if m.is_file() => m,
                // 扫描期间被删除或不是普通文件
                _ => continue,
            };
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            found.push((modified, entry.file_name().to_string_lossy().into_owned()));
        }

        Ok(found)
    }
}

/// 文件租约，drop 时释放
struct FileLease {
    leases: LeaseTable,
    file_name: String,
}

impl ArtifactLease for FileLease {}

impl Drop for FileLease {
    fn drop(&mut self) {
        if let Some(mut count) = self.leases.get_mut(&self.file_name) {
            *count = count.saturating_sub(1);
        }
        self.leases.remove_if(&self.file_name, |_, count| *count == 0);
    }
}

#[async_trait]
impl ArtifactStoragePort for FileArtifactStorage {
    async fn publish(&self, id: ArtifactId, data: &[u8]) -> Result<PathBuf, ArtifactStorageError> {
        let file_name = id.file_name(&self.extension);
        let path = self.base_dir.join(&file_name);
        let tmp = self.base_dir.join(format!("{}.part", file_name));

        if let Err(e) = fs::write(&tmp, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(file = %file_name, size = data.len(), "Published artifact");
        Ok(path)
    }

    async fn open(&self, file_name: &str) -> Result<OpenedArtifact, ArtifactStorageError> {
        // 只接受本存储生成的文件名，拒绝路径穿越
        if ArtifactId::from_file_name(file_name, &self.extension).is_none() {
            return Err(ArtifactStorageError::NotFound(file_name.to_string()));
        }

        let lease = self
            .try_acquire(file_name)
            .ok_or_else(|| ArtifactStorageError::NotFound(file_name.to_string()))?;
        let path = self.base_dir.join(file_name);
        let metadata = match fs::metadata(&path).await {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(ArtifactStorageError::NotFound(file_name.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ArtifactStorageError::NotFound(file_name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        Ok(OpenedArtifact {
            path,
            size: metadata.len(),
            lease: Box::new(lease),
        })
    }

    async fn enforce_limit(&self, max_count: usize) -> Result<RetentionReport, ArtifactStorageError> {
        let mut files = self.scan().await?;
        let mut report = RetentionReport {
            scanned: files.len(),
            ..Default::default()
        };
        if files.len() <= max_count {
            return Ok(report);
        }

        // 最旧的在前；修改时间相同按文件名排序
        files.sort();
        let excess = files.len() - max_count;

        for (_, file_name) in files.into_iter().take(excess) {
            if !self.claim_for_eviction(&file_name) {
                report.skipped_in_flight += 1;
                continue;
            }
            match fs::remove_file(self.base_dir.join(&file_name)).await {
                Ok(()) => report.deleted += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(file = %file_name, error = %e, "Failed to delete old artifact");
                }
            }
            self.release_claim(&file_name);
        }

        tracing::info!(
            scanned = report.scanned,
            deleted = report.deleted,
            skipped_in_flight = report.skipped_in_flight,
            max_count,
            "Output retention enforced"
        );

        Ok(report)
    }
}
