//! Worker Layer - 推理引擎串行化
//!
//! 实现 InferWorker：独占推理引擎，按顺序处理编码和合成任务

mod infer_worker;

pub use infer_worker::{EngineHandle, InferWorker, InferWorkerConfig};
