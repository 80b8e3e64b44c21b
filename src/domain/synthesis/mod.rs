//! Synthesis Context - 合成限界上下文
//!
//! 职责:
//! - 合成文本校验
//! - 生成产物（整文件输出）的标识与元数据

mod errors;
mod value_objects;

pub use errors::SynthesisError;
pub use value_objects::{ArtifactId, GeneratedArtifact, SynthesisText};
