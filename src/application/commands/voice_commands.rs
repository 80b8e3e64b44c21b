//! Voice Commands

/// 新增音色命令
#[derive(Debug, Clone)]
pub struct AddVoice {
    /// 原始音色名（未规范化）
    pub name: String,
    /// 参考音频对应文本
    pub reference_text: String,
    /// 上传的参考音频
    pub audio: Vec<u8>,
}

/// 删除音色命令
#[derive(Debug, Clone)]
pub struct DeleteVoice {
    pub name: String,
}
