//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 推理引擎配置
    #[serde(default)]
    pub engine: EngineConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 合成配置
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 公开访问的 Base URL（拼接 audioUrl 用）
    /// 未设置时优先使用请求的 Host 头
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// 获取公开的 Base URL
    pub fn public_base_url(&self) -> String {
        self.base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| {
                let host = if self.host == "0.0.0.0" {
                    "localhost"
                } else {
                    &self.host
                };
                format!("http://{}:{}", host, self.port)
            })
    }
}

/// 推理引擎类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// 远程推理服务
    #[default]
    Http,
    /// 内置的确定性引擎（开发/测试）
    Fake,
}

/// 推理引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub kind: EngineKind,

    /// 推理服务基础 URL
    #[serde(default = "default_engine_url")]
    pub url: String,

    /// 模型描述（健康检查接口展示）
    #[serde(default = "default_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,

    /// 健康检查重试间隔（秒）
    #[serde(default = "default_health_retry")]
    pub health_retry_secs: u64,

    /// 任务队列容量
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,

    /// 每个请求的采样块缓冲数
    #[serde(default = "default_chunk_buffer")]
    pub chunk_buffer: usize,
}

fn default_engine_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_model() -> String {
    "neuphonic/neutts-air".to_string()
}

fn default_engine_timeout() -> u64 {
    300
}

fn default_health_retry() -> u64 {
    2
}

fn default_queue_size() -> usize {
    64
}

fn default_chunk_buffer() -> usize {
    16
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            url: default_engine_url(),
            model: default_model(),
            timeout_secs: default_engine_timeout(),
            health_retry_secs: default_health_retry(),
            queue_size: default_queue_size(),
            chunk_buffer: default_chunk_buffer(),
        }
    }
}

impl EngineConfig {
    pub fn health_retry(&self) -> Duration {
        Duration::from_secs(self.health_retry_secs)
    }
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 音色参考目录
    #[serde(default = "default_samples_dir")]
    pub samples_dir: PathBuf,

    /// 生成音频目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 保留的生成音频数量上限
    #[serde(default = "default_max_output_files")]
    pub max_output_files: usize,

    /// 上传文件最大大小（字节），默认 20MB
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

fn default_samples_dir() -> PathBuf {
    PathBuf::from("samples")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_max_output_files() -> usize {
    100
}

fn default_max_upload_size() -> usize {
    20 * 1024 * 1024 // 20 MB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            samples_dir: default_samples_dir(),
            output_dir: default_output_dir(),
            max_output_files: default_max_output_files(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

/// 合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthesisConfig {
    /// 未指定音色时使用的默认音色
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// 输出采样率（Hz）
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// 整文件合成超时（秒），0 表示不限制
    #[serde(default)]
    pub timeout_secs: u64,
}

fn default_voice() -> String {
    "dave".to_string()
}

fn default_sample_rate() -> u32 {
    24000
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            default_voice: default_voice(),
            sample_rate: default_sample_rate(),
            timeout_secs: 0,
        }
    }
}

impl SynthesisConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8001);
        assert_eq!(config.engine.kind, EngineKind::Http);
        assert_eq!(config.engine.url, "http://localhost:8000");
        assert_eq!(config.storage.max_output_files, 100);
        assert_eq!(config.synthesis.default_voice, "dave");
        assert_eq!(config.synthesis.sample_rate, 24000);
        assert!(config.synthesis.timeout().is_none());
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8001");
        assert_eq!(config.public_base_url(), "http://localhost:8001");
    }

    #[test]
    fn test_public_base_url_prefers_configured_value() {
        let config = ServerConfig {
            base_url: Some("https://tts.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.public_base_url(), "https://tts.example.com");
    }
}
