//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、VoiceStore、ArtifactStorage、AudioEncoder）
//! - commands: CQRS 命令及处理器（音色增删、合成）
//! - queries: CQRS 查询及处理器（音色查询、服务状态、产物下载）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    handlers::{
        AddVoiceHandler, AddVoiceResponse, AudioFrameStream, DeleteVoiceHandler,
        StreamSpeechHandler, StreamSpeechResponse, SynthesisSettings, SynthesizeSpeechHandler,
        SynthesizeSpeechResponse,
    },
    AddVoice, DeleteVoice, StreamSpeech, SynthesizeSpeech,
};

pub use error::ApplicationError;

pub use ports::{
    ArtifactStoragePort, AudioEncoderPort, EngineError, FrameEncoder, InferRequest,
    OpenedArtifact, RetentionReport, TtsEnginePort, VoiceStorePort,
};

pub use queries::{
    handlers::{
        GetAudioHandler, GetVoiceHandler, ListVoicesHandler, ServiceStatusHandler,
        ServiceStatusResponse, VoiceListResponse,
    },
    GetAudioQuery, GetServiceStatus, GetVoice, ListVoices,
};
