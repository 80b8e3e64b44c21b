//! Voxserve - 声音克隆 TTS 服务
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Context: 音色参考（名称、参考编码、参考文本）
//! - Synthesis Context: 合成文本与生成产物
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TtsEngine, VoiceStore, ArtifactStorage, AudioEncoder）
//! - Commands: 音色增删、整文件合成、流式合成
//! - Queries: 音色查询、服务状态、产物下载
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: RESTful API（axum）
//! - Worker: InferWorker 独占引擎并串行执行任务
//! - Persistence: 基于文件的音色仓储
//! - Adapters: HTTP/Fake 推理引擎、WAV 编码器、产物存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
