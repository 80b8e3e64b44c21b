//! Voice Context - Aggregate Root

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::{EncodedReference, ReferenceText, VoiceName};

/// 音色参考
///
/// 不变量:
/// - 只有在编码文件和文本文件都已落盘后才会进入内存索引
/// - 参考音频是可选的，仅在创建时提供了源音频才存在
#[derive(Debug, Clone)]
pub struct VoiceReference {
    name: VoiceName,
    encoded: EncodedReference,
    reference_text: ReferenceText,
    codes_path: PathBuf,
    text_path: PathBuf,
    audio_path: Option<PathBuf>,
}

impl VoiceReference {
    pub fn new(
        name: VoiceName,
        encoded: EncodedReference,
        reference_text: ReferenceText,
        codes_path: PathBuf,
        text_path: PathBuf,
        audio_path: Option<PathBuf>,
    ) -> Self {
        Self {
            name,
            encoded,
            reference_text,
            codes_path,
            text_path,
            audio_path,
        }
    }

    /// 生成列表摘要
    pub fn summary(&self) -> VoiceSummary {
        VoiceSummary {
            name: self.name.to_string(),
            text_path: self.text_path.display().to_string(),
            codes_path: self.codes_path.display().to_string(),
            audio_path: self.audio_path.as_ref().map(|p| p.display().to_string()),
            has_audio: self.audio_path.is_some(),
        }
    }

    // Getters
    pub fn name(&self) -> &VoiceName {
        &self.name
    }

    pub fn encoded(&self) -> &EncodedReference {
        &self.encoded
    }

    pub fn reference_text(&self) -> &ReferenceText {
        &self.reference_text
    }

    pub fn codes_path(&self) -> &Path {
        &self.codes_path
    }

    pub fn text_path(&self) -> &Path {
        &self.text_path
    }

    pub fn audio_path(&self) -> Option<&Path> {
        self.audio_path.as_deref()
    }
}

/// 音色摘要（列表展示用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceSummary {
    pub name: String,
    pub text_path: String,
    pub codes_path: String,
    pub audio_path: Option<String>,
    pub has_audio: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_reports_audio_presence() {
        let voice = VoiceReference::new(
            VoiceName::parse("jo").unwrap(),
            EncodedReference::new(vec![1, 2, 3]),
            ReferenceText::new("hi there").unwrap(),
            PathBuf::from("samples/jo.pt"),
            PathBuf::from("samples/jo.txt"),
            Some(PathBuf::from("samples/jo.wav")),
        );

        let summary = voice.summary();
        assert_eq!(summary.name, "jo");
        assert!(summary.has_audio);
        assert_eq!(summary.audio_path.as_deref(), Some("samples/jo.wav"));
        assert_eq!(voice.encoded().len(), 3);
    }
}
