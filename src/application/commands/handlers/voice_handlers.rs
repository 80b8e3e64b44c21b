//! Voice Command Handlers

use std::sync::Arc;

use crate::application::commands::{AddVoice, DeleteVoice};
use crate::application::error::ApplicationError;
use crate::application::ports::{
    EngineError, NewVoice, TtsEnginePort, VoiceStoreError, VoiceStorePort,
};
use crate::domain::voice::{ReferenceText, VoiceName};

// ============================================================================
// AddVoice
// ============================================================================

/// 新增音色响应
#[derive(Debug, Clone)]
pub struct AddVoiceResponse {
    pub name: String,
}

/// AddVoice Handler
///
/// 流程：校验 → 暂存源音频 → 引擎编码 → 仓储提交。
/// 编码失败时删除暂存音频；仓储提交失败时由仓储回滚
pub struct AddVoiceHandler {
    voice_store: Arc<dyn VoiceStorePort>,
    engine: Arc<dyn TtsEnginePort>,
}

impl AddVoiceHandler {
    pub fn new(voice_store: Arc<dyn VoiceStorePort>, engine: Arc<dyn TtsEnginePort>) -> Self {
        Self {
            voice_store,
            engine,
        }
    }

    pub async fn handle(&self, command: AddVoice) -> Result<AddVoiceResponse, ApplicationError> {
        if !self.engine.is_ready() {
            return Err(EngineError::NotReady.into());
        }

        let name = VoiceName::parse(&command.name)?;
        let reference_text = ReferenceText::new(&command.reference_text)?;
        if command.audio.is_empty() {
            return Err(ApplicationError::invalid_argument("Audio file is empty"));
        }
        if self.voice_store.contains(&name) {
            return Err(VoiceStoreError::AlreadyExists(name.to_string()).into());
        }

        let staged = self.voice_store.stage_audio(&name, &command.audio).await?;

        tracing::info!(voice = %name, bytes = command.audio.len(), "Encoding voice");
        let encoded = match self.engine.encode_reference(&staged).await {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(voice = %name, error = %e, "Reference encoding failed");
                self.voice_store.discard_staged(&staged).await;
                return Err(e.into());
            }
        };

        let voice = self
            .voice_store
            .add(NewVoice {
                name: name.clone(),
                encoded,
                reference_text,
                staged_audio: Some(staged),
            })
            .await?;

        tracing::info!(voice = %name, has_audio = voice.audio_path().is_some(), "Voice added");

        Ok(AddVoiceResponse {
            name: name.to_string(),
        })
    }
}

// ============================================================================
// DeleteVoice
// ============================================================================

/// DeleteVoice Handler
pub struct DeleteVoiceHandler {
    voice_store: Arc<dyn VoiceStorePort>,
}

impl DeleteVoiceHandler {
    pub fn new(voice_store: Arc<dyn VoiceStorePort>) -> Self {
        Self { voice_store }
    }

    pub async fn handle(&self, command: DeleteVoice) -> Result<String, ApplicationError> {
        // 非法名称不可能存在于仓储中，按未找到处理
        let name = VoiceName::parse(&command.name).map_err(|_| {
            ApplicationError::not_found(format!("Voice '{}' not found", command.name))
        })?;

        self.voice_store.delete(&name).await?;

        tracing::info!(voice = %name, "Voice deleted");

        Ok(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{InferRequest, SampleChunkStream};
    use crate::domain::voice::EncodedReference;
    use crate::infrastructure::adapters::{FakeTtsEngine, FakeTtsEngineConfig};
    use crate::infrastructure::persistence::file::FileVoiceStore;
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::TempDir;

    struct BrokenEncoder;

    struct ColdEngine;

    #[async_trait]
    impl TtsEnginePort for ColdEngine {
        async fn encode_reference(&self, _audio_path: &Path) -> Result<EncodedReference, EngineError> {
            Ok(EncodedReference::new(vec![1, 2, 3]))
        }

        async fn infer_stream(&self, _request: InferRequest) -> Result<SampleChunkStream, EngineError> {
            Err(EngineError::NotReady)
        }

        fn is_ready(&self) -> bool {
            false
        }

        fn model_name(&self) -> String {
            "cold".to_string()
        }
    }

    #[async_trait]
    impl TtsEnginePort for BrokenEncoder {
        async fn encode_reference(&self, _audio_path: &Path) -> Result<EncodedReference, EngineError> {
            Err(EngineError::ServiceError("unsupported audio".to_string()))
        }

        async fn infer_stream(&self, _request: InferRequest) -> Result<SampleChunkStream, EngineError> {
            Err(EngineError::ServiceError("unused".to_string()))
        }

        fn model_name(&self) -> String {
            "broken".to_string()
        }
    }

    async fn setup(engine: Arc<dyn TtsEnginePort>) -> (TempDir, Arc<FileVoiceStore>, AddVoiceHandler) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileVoiceStore::new(dir.path()).await.unwrap());
        let handler = AddVoiceHandler::new(store.clone(), engine);
        (dir, store, handler)
    }

    fn add_jo() -> AddVoice {
        AddVoice {
            name: "Jo".to_string(),
            reference_text: " hi there ".to_string(),
            audio: b"RIFF-fake-audio".to_vec(),
        }
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_add_then_get_then_delete() {
        let engine = Arc::new(FakeTtsEngine::new(FakeTtsEngineConfig::default()));
        let (dir, store, handler) = setup(engine).await;

        let added = handler.handle(add_jo()).await.unwrap();
        assert_eq!(added.name, "jo");

        let name = VoiceName::parse("JO").unwrap();
        let voice = store.get(&name).unwrap();
        assert!(voice.audio_path().is_some());
        assert_eq!(voice.reference_text().as_str(), "hi there");
        assert!(!voice.encoded().is_empty());
        assert_eq!(dir_entries(dir.path()), vec!["jo.pt", "jo.txt", "jo.wav"]);

        let deleted = DeleteVoiceHandler::new(store.clone())
            .handle(DeleteVoice { name: "jo".to_string() })
            .await
            .unwrap();
        assert_eq!(deleted, "jo");
        assert!(store.get(&name).is_none());
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_invalid_name_leaves_no_files() {
        let engine = Arc::new(FakeTtsEngine::new(FakeTtsEngineConfig::default()));
        let (dir, store, handler) = setup(engine).await;

        let err = handler
            .handle(AddVoice {
                name: "jo-2".to_string(),
                ..add_jo()
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::InvalidArgument(_)));
        assert_eq!(store.names().len(), 0);
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_name_keeps_existing_artifacts() {
        let engine = Arc::new(FakeTtsEngine::new(FakeTtsEngineConfig::default()));
        let (dir, _store, handler) = setup(engine).await;

        handler.handle(add_jo()).await.unwrap();
        let before: Vec<Vec<u8>> = ["jo.pt", "jo.txt", "jo.wav"]
            .iter()
            .map(|f| std::fs::read(dir.path().join(f)).unwrap())
            .collect();

        let err = handler
            .handle(AddVoice {
                reference_text: "something else".to_string(),
                audio: b"different audio".to_vec(),
                ..add_jo()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Conflict(_)));

        let after: Vec<Vec<u8>> = ["jo.pt", "jo.txt", "jo.wav"]
            .iter()
            .map(|f| std::fs::read(dir.path().join(f)).unwrap())
            .collect();
        assert_eq!(before, after);
        assert_eq!(dir_entries(dir.path()).len(), 3);
    }

    #[tokio::test]
    async fn test_encoding_failure_removes_staged_audio() {
        let (dir, store, handler) = setup(Arc::new(BrokenEncoder)).await;

        let err = handler.handle(add_jo()).await.unwrap_err();

        assert!(matches!(err, ApplicationError::Internal(_)));
        assert!(store.get(&VoiceName::parse("jo").unwrap()).is_none());
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_add_voice_when_engine_not_ready_is_unavailable() {
        let (dir, store, handler) = setup(Arc::new(ColdEngine)).await;

        let err = handler.handle(add_jo()).await.unwrap_err();

        assert!(matches!(err, ApplicationError::Unavailable(_)));
        assert_eq!(store.names().len(), 0);
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_voice_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileVoiceStore::new(dir.path()).await.unwrap());
        let handler = DeleteVoiceHandler::new(store);

        for name in ["ghost", "../etc"] {
            let err = handler
                .handle(DeleteVoice { name: name.to_string() })
                .await
                .unwrap_err();
            assert!(matches!(err, ApplicationError::NotFound(_)));
        }
    }
}
