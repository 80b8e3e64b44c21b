//! Voice Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{TtsEnginePort, VoiceStorePort};
use crate::application::queries::{GetServiceStatus, GetVoice, ListVoices};
use crate::domain::voice::{VoiceName, VoiceSummary};

// ============================================================================
// Response DTOs
// ============================================================================

/// 音色列表响应
#[derive(Debug, Clone)]
pub struct VoiceListResponse {
    pub voices: Vec<VoiceSummary>,
    pub count: usize,
}

/// 服务状态响应
#[derive(Debug, Clone)]
pub struct ServiceStatusResponse {
    pub ready: bool,
    pub model: String,
    pub available_voices: Vec<String>,
    pub default_voice: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GetVoice Handler
pub struct GetVoiceHandler {
    voice_store: Arc<dyn VoiceStorePort>,
}

impl GetVoiceHandler {
    pub fn new(voice_store: Arc<dyn VoiceStorePort>) -> Self {
        Self { voice_store }
    }

    pub fn handle(&self, query: GetVoice) -> Result<VoiceSummary, ApplicationError> {
        VoiceName::parse(&query.name)
            .ok()
            .and_then(|name| self.voice_store.get(&name))
            .map(|voice| voice.summary())
            .ok_or_else(|| ApplicationError::not_found(format!("Voice '{}' not found", query.name)))
    }
}

/// ListVoices Handler
pub struct ListVoicesHandler {
    voice_store: Arc<dyn VoiceStorePort>,
}

impl ListVoicesHandler {
    pub fn new(voice_store: Arc<dyn VoiceStorePort>) -> Self {
        Self { voice_store }
    }

    pub fn handle(&self, _query: ListVoices) -> VoiceListResponse {
        let voices: Vec<VoiceSummary> = self.voice_store.list().collect();
        VoiceListResponse {
            count: voices.len(),
            voices,
        }
    }
}

/// GetServiceStatus Handler
pub struct ServiceStatusHandler {
    voice_store: Arc<dyn VoiceStorePort>,
    engine: Arc<dyn TtsEnginePort>,
    default_voice: String,
}

impl ServiceStatusHandler {
    pub fn new(
        voice_store: Arc<dyn VoiceStorePort>,
        engine: Arc<dyn TtsEnginePort>,
        default_voice: impl Into<String>,
    ) -> Self {
        Self {
            voice_store,
            engine,
            default_voice: default_voice.into(),
        }
    }

    pub fn handle(&self, _query: GetServiceStatus) -> ServiceStatusResponse {
        ServiceStatusResponse {
            ready: self.engine.is_ready(),
            model: self.engine.model_name(),
            available_voices: self.voice_store.names(),
            default_voice: self.default_voice.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NewVoice;
    use crate::domain::voice::{EncodedReference, ReferenceText};
    use crate::infrastructure::adapters::{FakeTtsEngine, FakeTtsEngineConfig};
    use crate::infrastructure::persistence::file::FileVoiceStore;
    use tempfile::TempDir;

    async fn store_with(names: &[&str]) -> (TempDir, Arc<FileVoiceStore>) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(FileVoiceStore::new(dir.path()).await.unwrap());
        for name in names {
            store
                .add(NewVoice {
                    name: VoiceName::parse(name).unwrap(),
                    encoded: EncodedReference::new(vec![1]),
                    reference_text: ReferenceText::new("hello").unwrap(),
                    staged_audio: None,
                })
                .await
                .unwrap();
        }
        (dir, store)
    }

    #[tokio::test]
    async fn test_list_is_restartable() {
        let (_dir, store) = store_with(&["dave", "jo"]).await;
        let handler = ListVoicesHandler::new(store);

        let first = handler.handle(ListVoices);
        let second = handler.handle(ListVoices);

        assert_eq!(first.count, 2);
        assert_eq!(second.count, 2);
        assert!(first.voices.iter().all(|v| !v.has_audio));
    }

    #[tokio::test]
    async fn test_get_voice_is_case_insensitive() {
        let (_dir, store) = store_with(&["dave"]).await;
        let handler = GetVoiceHandler::new(store);

        assert_eq!(handler.handle(GetVoice { name: "DAVE".into() }).unwrap().name, "dave");
        assert!(matches!(
            handler.handle(GetVoice { name: "nobody".into() }),
            Err(ApplicationError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_status_reports_voices_and_default() {
        let (_dir, store) = store_with(&["dave"]).await;
        let engine = Arc::new(FakeTtsEngine::new(FakeTtsEngineConfig::default()));
        let handler = ServiceStatusHandler::new(store, engine, "dave");

        let status = handler.handle(GetServiceStatus);
        assert!(status.ready);
        assert_eq!(status.available_voices, vec!["dave".to_string()]);
        assert_eq!(status.default_voice, "dave");
    }
}
