//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Voice Context: 音色参考管理
//! - Synthesis Context: 合成请求与生成产物

pub mod synthesis;
pub mod voice;
