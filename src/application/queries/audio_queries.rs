//! Audio Queries - 生成产物下载

/// 获取生成产物查询
#[derive(Debug, Clone)]
pub struct GetAudioQuery {
    /// 产物文件名，例如 `3f0c...e1.wav`
    pub file_name: String,
}
