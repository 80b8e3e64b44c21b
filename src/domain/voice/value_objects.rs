//! Voice Context - Value Objects

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::VoiceError;

/// 音色名称
///
/// 不变量:
/// - 已去除首尾空白并转为小写
/// - 非空，且只包含字母或数字（同时用作磁盘文件名的 stem）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceName(String);

impl VoiceName {
    /// 名称最大长度
    pub const MAX_LEN: usize = 64;

    /// 规范化并校验音色名称
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, VoiceError> {
        let name = raw.as_ref().trim().to_lowercase();
        if name.is_empty() {
            return Err(VoiceError::InvalidName(
                "Voice name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > Self::MAX_LEN {
            return Err(VoiceError::InvalidName(format!(
                "Voice name must be at most {} characters",
                Self::MAX_LEN
            )));
        }
        if !name.chars().all(char::is_alphanumeric) {
            return Err(VoiceError::InvalidName(
                "Voice name must be alphanumeric".to_string(),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VoiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 推理引擎对参考音频的编码结果
///
/// 对服务层是不透明的字节序列，只会原样回传给引擎
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedReference(Arc<[u8]>);

impl EncodedReference {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(bytes.into()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for EncodedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncodedReference({} bytes)", self.0.len())
    }
}

/// 参考音频对应的文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceText(String);

impl ReferenceText {
    pub fn new(text: impl AsRef<str>) -> Result<Self, VoiceError> {
        let text = text.as_ref().trim();
        if text.is_empty() {
            return Err(VoiceError::EmptyReferenceText);
        }
        Ok(Self(text.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_name_is_normalized() {
        let name = VoiceName::parse("  Dave ").unwrap();
        assert_eq!(name.as_str(), "dave");
    }

    #[test]
    fn test_voice_name_rejects_non_alphanumeric() {
        for raw in ["", "   ", "jo-2", "../etc", "a b", "dave.pt"] {
            assert!(
                matches!(VoiceName::parse(raw), Err(VoiceError::InvalidName(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_voice_name_accepts_digits_and_unicode_letters() {
        assert_eq!(VoiceName::parse("Jo2").unwrap().as_str(), "jo2");
        assert_eq!(VoiceName::parse("小明").unwrap().as_str(), "小明");
    }

    #[test]
    fn test_voice_name_length_limit() {
        let long = "a".repeat(VoiceName::MAX_LEN + 1);
        assert!(VoiceName::parse(long).is_err());
    }

    #[test]
    fn test_reference_text_is_trimmed() {
        let text = ReferenceText::new("  hi there \n").unwrap();
        assert_eq!(text.as_str(), "hi there");
        assert!(ReferenceText::new(" \t").is_err());
    }
}
