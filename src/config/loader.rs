//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, EngineKind};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "VOXSERVE";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `VOXSERVE_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `VOXSERVE_SERVER__PORT=8080`
/// - `VOXSERVE_SERVER__BASE_URL=https://tts.example.com`
/// - `VOXSERVE_ENGINE__URL=http://tts-engine:8000`
/// - `VOXSERVE_STORAGE__MAX_OUTPUT_FILES=50`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8001)?
        .set_default("engine.kind", "http")?
        .set_default("engine.url", "http://localhost:8000")?
        .set_default("engine.model", "neuphonic/neutts-air")?
        .set_default("engine.timeout_secs", 300)?
        .set_default("engine.health_retry_secs", 2)?
        .set_default("engine.queue_size", 64)?
        .set_default("engine.chunk_buffer", 16)?
        .set_default("storage.samples_dir", "samples")?
        .set_default("storage.output_dir", "output")?
        .set_default("storage.max_output_files", 100)?
        .set_default("storage.max_upload_size", 20 * 1024 * 1024)?
        .set_default("synthesis.default_voice", "dave")?
        .set_default("synthesis.sample_rate", 24000)?
        .set_default("synthesis.timeout_secs", 0)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量（最高优先级）
    // 例如: VOXSERVE_ENGINE__URL=http://tts-engine:8000
    // 注意: 环境变量名会被转换为小写
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.engine.kind == EngineKind::Http && config.engine.url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Engine URL cannot be empty".to_string(),
        ));
    }

    if config.storage.max_output_files == 0 {
        return Err(ConfigError::ValidationError(
            "max_output_files must be at least 1".to_string(),
        ));
    }

    if config.synthesis.sample_rate == 0 {
        return Err(ConfigError::ValidationError(
            "Sample rate cannot be 0".to_string(),
        ));
    }

    if config.synthesis.default_voice.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Default voice cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Public Base URL: {}", config.server.public_base_url());
    tracing::info!("Engine: {:?} ({})", config.engine.kind, config.engine.model);
    if config.engine.kind == EngineKind::Http {
        tracing::info!("Engine URL: {}", config.engine.url);
        tracing::info!("Engine Timeout: {}s", config.engine.timeout_secs);
    }
    tracing::info!("Samples Directory: {:?}", config.storage.samples_dir);
    tracing::info!("Output Directory: {:?}", config.storage.output_dir);
    tracing::info!("Max Output Files: {}", config.storage.max_output_files);
    tracing::info!("Default Voice: {}", config.synthesis.default_voice);
    tracing::info!("Sample Rate: {} Hz", config.synthesis.sample_rate);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validation_passes_for_valid_config() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_engine_url_only_matters_for_http_engine() {
        let mut config = AppConfig::default();
        config.engine.url = String::new();
        assert!(validate_config(&config).is_err());

        config.engine.kind = EngineKind::Fake;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_for_zero_retention() {
        let mut config = AppConfig::default();
        config.storage.max_output_files = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validation_error_for_blank_default_voice() {
        let mut config = AppConfig::default();
        config.synthesis.default_voice = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[engine]\nkind = \"fake\"\n\n[storage]\nmax_output_files = 5\n\n[synthesis]\ndefault_voice = \"jo\""
        )
        .unwrap();

        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.engine.kind, EngineKind::Fake);
        assert_eq!(config.storage.max_output_files, 5);
        assert_eq!(config.synthesis.default_voice, "jo");
        assert_eq!(config.server.port, 8001);
    }
}
