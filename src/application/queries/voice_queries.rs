//! Voice Queries

/// 获取音色详情查询
#[derive(Debug, Clone)]
pub struct GetVoice {
    pub name: String,
}

/// 列出所有音色查询
#[derive(Debug, Clone)]
pub struct ListVoices;

/// 服务状态查询
#[derive(Debug, Clone)]
pub struct GetServiceStatus;
