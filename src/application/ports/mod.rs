//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod artifact_storage;
mod audio_encoder;
mod tts_engine;
mod voice_store;

pub use artifact_storage::{
    ArtifactLease, ArtifactStorageError, ArtifactStoragePort, OpenedArtifact, RetentionReport,
};
pub use audio_encoder::{AudioEncoderPort, EncodeError, FrameEncoder};
pub use tts_engine::{EngineError, InferRequest, SampleChunkStream, TtsEnginePort};
pub use voice_store::{NewVoice, VoiceStoreError, VoiceStorePort, VoiceSummaries};
