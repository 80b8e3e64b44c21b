//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod http;
pub mod persistence;
pub mod worker;

pub use persistence::FileVoiceStore;
pub use worker::{EngineHandle, InferWorker, InferWorkerConfig};
