//! Synthesis Commands

/// 整文件合成命令
#[derive(Debug, Clone)]
pub struct SynthesizeSpeech {
    pub text: String,
    /// 为空时使用默认音色
    pub voice: Option<String>,
}

/// 流式合成命令
#[derive(Debug, Clone)]
pub struct StreamSpeech {
    pub text: String,
    /// 为空时使用默认音色
    pub voice: Option<String>,
}
