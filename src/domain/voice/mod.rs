//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - 音色名称规范化与校验
//! - 参考编码、参考文本与文件位置的聚合

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::{VoiceReference, VoiceSummary};
pub use errors::VoiceError;
pub use value_objects::{EncodedReference, ReferenceText, VoiceName};
