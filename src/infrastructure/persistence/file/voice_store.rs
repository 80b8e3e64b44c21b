//! File Voice Store
//!
//! 磁盘布局（samples 目录下，每个音色 `<name>`）:
//! - `<name>.pt`  参考音频编码（不透明字节）
//! - `<name>.txt` 参考文本，同时作为提交标记
//! - `<name>.wav` 源音频（可选）

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::application::ports::{NewVoice, VoiceStoreError, VoiceStorePort, VoiceSummaries};
use crate::domain::voice::{EncodedReference, ReferenceText, VoiceName, VoiceReference};

const CODES_EXT: &str = "pt";
const TEXT_EXT: &str = "txt";
const AUDIO_EXT: &str = "wav";

/// 基于文件的音色仓储
///
/// 读操作直接访问 DashMap；新增和删除由写锁串行化
pub struct FileVoiceStore {
    base_dir: PathBuf,
    voices: DashMap<VoiceName, Arc<VoiceReference>>,
    write_lock: Mutex<()>,
}

impl FileVoiceStore {
    /// 创建仓储并确保目录存在（不会自动加载，需调用 `load_all`）
    pub async fn new(base_dir: impl AsRef<Path>) -> Result<Self, VoiceStoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).await?;

        Ok(Self {
            base_dir,
            voices: DashMap::new(),
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, name: &VoiceName, ext: &str) -> PathBuf {
        self.base_dir.join(format!("{}.{}", name, ext))
    }

    /// 读取单个音色；缺少提交标记时返回 None
    async fn load_one(&self, name: VoiceName) -> Result<Option<VoiceReference>, VoiceStoreError> {
        let codes_path = self.path_for(&name, CODES_EXT);
        let text_path = self.path_for(&name, TEXT_EXT);
        let audio_path = self.path_for(&name, AUDIO_EXT);

        let text = match fs::read_to_string(&text_path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let reference_text = match ReferenceText::new(&text) {
            Ok(t) => t,
            Err(_) => {
                tracing::warn!(voice = %name, "Skipping voice with empty reference text");
                return Ok(None);
            }
        };
        let encoded = EncodedReference::new(fs::read(&codes_path).await?);
        let audio_path = fs::try_exists(&audio_path)
            .await
            .unwrap_or(false)
            .then_some(audio_path);

        Ok(Some(VoiceReference::new(
            name,
            encoded,
            reference_text,
            codes_path,
            text_path,
            audio_path,
        )))
    }

    /// 提交新增音色的所有文件，失败时由调用方回滚 `written`
    async fn commit_files(
        &self,
        voice: &NewVoice,
        written: &mut Vec<PathBuf>,
    ) -> Result<Option<PathBuf>, VoiceStoreError> {
        let codes_path = self.path_for(&voice.name, CODES_EXT);
        written.push(codes_path.clone());
        write_atomic(&codes_path, voice.encoded.as_bytes()).await?;

        let audio_path = match &voice.staged_audio {
            Some(staged) => {
                let audio_path = self.path_for(&voice.name, AUDIO_EXT);
                written.push(audio_path.clone());
                fs::rename(staged, &audio_path).await?;
                Some(audio_path)
            }
            None => None,
        };

        // 提交标记最后写入
        let text_path = self.path_for(&voice.name, TEXT_EXT);
        written.push(text_path.clone());
        write_atomic(&text_path, voice.reference_text.as_str().as_bytes()).await?;

        Ok(audio_path)
    }
}

/// 先写临时文件再 rename，读者永远看不到写了一半的文件
async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), VoiceStoreError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple()));

    let result = async {
        fs::write(&tmp, data).await?;
        fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    Ok(())
}

/// 删除文件，不存在不算错误
async fn remove_if_exists(path: &Path) -> std::io::Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl VoiceStorePort for FileVoiceStore {
    async fn load_all(&self) -> Result<usize, VoiceStoreError> {
        let _guard = self.write_lock.lock().await;

        let mut loaded = Vec::new();
        let mut entries = fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map_or(true, |ext| ext != CODES_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let name = match VoiceName::parse(&stem) {
                Ok(name) if name.as_str() == stem => name,
                _ => {
                    tracing::warn!(file = %path.display(), "Skipping voice file with invalid name");
                    continue;
                }
            };

            match self.load_one(name.clone()).await {
                Ok(Some(voice)) => loaded.push(voice),
                Ok(None) => {
                    tracing::warn!(voice = %name, "Skipping voice without reference text");
                }
                Err(e) => {
                    tracing::warn!(voice = %name, error = %e, "Failed to load voice");
                }
            }
        }

        self.voices.clear();
        for voice in loaded {
            tracing::info!(voice = %voice.name(), has_audio = voice.audio_path().is_some(), "Loaded voice");
            self.voices.insert(voice.name().clone(), Arc::new(voice));
        }

        let count = self.voices.len();
        if count == 0 {
            tracing::warn!(dir = %self.base_dir.display(), "No voices found");
        }
        Ok(count)
    }

    fn get(&self, name: &VoiceName) -> Option<Arc<VoiceReference>> {
        self.voices.get(name).map(|v| v.value().clone())
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.voices.iter().map(|v| v.key().to_string()).collect();
        names.sort();
        names
    }

    fn list(&self) -> VoiceSummaries<'_> {
        let mut voices: Vec<Arc<VoiceReference>> =
            self.voices.iter().map(|v| v.value().clone()).collect();
        voices.sort_by(|a, b| a.name().as_str().cmp(b.name().as_str()));
        Box::new(voices.into_iter().map(|v| v.summary()))
    }

    async fn stage_audio(&self, name: &VoiceName, data: &[u8]) -> Result<PathBuf, VoiceStoreError> {
        let staged = self
            .base_dir
            .join(format!(".{}-{}.upload", name, Uuid::new_v4().simple()));
        if let Err(e) = fs::write(&staged, data).await {
            let _ = fs::remove_file(&staged).await;
            return Err(e.into());
        }
        Ok(staged)
    }

    async fn discard_staged(&self, staged: &Path) {
        if let Err(e) = remove_if_exists(staged).await {
            tracing::warn!(file = %staged.display(), error = %e, "Failed to remove staged audio");
        }
    }

    async fn add(&self, voice: NewVoice) -> Result<Arc<VoiceReference>, VoiceStoreError> {
        let _guard = self.write_lock.lock().await;

        if self.voices.contains_key(&voice.name) {
            if let Some(staged) = &voice.staged_audio {
                self.discard_staged(staged).await;
            }
            return Err(VoiceStoreError::AlreadyExists(voice.name.to_string()));
        }

        let mut written = Vec::new();
        let audio_path = match self.commit_files(&voice, &mut written).await {
            Ok(audio_path) => audio_path,
            Err(e) => {
                tracing::error!(voice = %voice.name, error = %e, "Failed to persist voice, rolling back");
                for path in written.iter().chain(voice.staged_audio.iter()) {
                    if let Err(e) = remove_if_exists(path).await {
                        tracing::warn!(file = %path.display(), error = %e, "Rollback failed");
                    }
                }
                return Err(e);
            }
        };

        let reference = Arc::new(VoiceReference::new(
            voice.name.clone(),
            voice.encoded,
            voice.reference_text,
            self.path_for(&voice.name, CODES_EXT),
            self.path_for(&voice.name, TEXT_EXT),
            audio_path,
        ));
        self.voices.insert(voice.name, reference.clone());

        Ok(reference)
    }

    async fn delete(&self, name: &VoiceName) -> Result<(), VoiceStoreError> {
        let _guard = self.write_lock.lock().await;

        let Some(voice) = self.get(name) else {
            return Err(VoiceStoreError::NotFound(name.to_string()));
        };

        // 先删提交标记；失败则不做任何改动
        remove_if_exists(voice.text_path()).await?;
        self.voices.remove(name);

        let mut rest = vec![voice.codes_path()];
        rest.extend(voice.audio_path());
        for path in rest {
            if let Err(e) = remove_if_exists(path).await {
                tracing::warn!(voice = %name, file = %path.display(), error = %e, "Failed to remove voice file");
            }
        }

        Ok(())
    }
}
