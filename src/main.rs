//! Voxserve - 声音克隆 TTS 服务
//!
//! 启动流程：加载配置 → 初始化日志 → 加载音色 → 启动引擎 worker → 启动 HTTP 服务

use std::sync::Arc;

use voxserve::application::{AudioEncoderPort, SynthesisSettings, TtsEnginePort, VoiceStorePort};
use voxserve::config::{load_config, print_config, AppConfig, EngineKind};
use voxserve::infrastructure::adapters::{
    FakeTtsEngine, FakeTtsEngineConfig, FileArtifactStorage, HttpTtsClient, HttpTtsClientConfig,
    WavEncoder,
};
use voxserve::infrastructure::http::{AppState, HttpServer, ServerConfig};
use voxserve::infrastructure::persistence::FileVoiceStore;
use voxserve::infrastructure::worker::{InferWorker, InferWorkerConfig};

fn init_logging(config: &AppConfig) {
    let log_filter = format!(
        "{},voxserve={},tower_http=debug",
        config.log.level, config.log.level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置创建底层推理引擎
fn build_engine(config: &AppConfig) -> anyhow::Result<Arc<dyn TtsEnginePort>> {
    let engine: Arc<dyn TtsEnginePort> = match config.engine.kind {
        EngineKind::Http => {
            let client_config = HttpTtsClientConfig::new(&config.engine.url)
                .with_timeout(config.engine.timeout_secs)
                .with_model(&config.engine.model);
            Arc::new(HttpTtsClient::new(client_config)?)
        }
        EngineKind::Fake => Arc::new(FakeTtsEngine::new(FakeTtsEngineConfig {
            sample_rate: config.synthesis.sample_rate,
            ..Default::default()
        })),
    };
    Ok(engine)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config);

    tracing::info!("Voxserve - 声音克隆 TTS 服务");
    print_config(&config);

    // 音色仓储
    let voice_store = Arc::new(FileVoiceStore::new(&config.storage.samples_dir).await?);
    let loaded = voice_store.load_all().await?;
    tracing::info!(count = loaded, voices = ?voice_store.names(), "Voices loaded");

    // 产物存储与编码器
    let encoder = Arc::new(WavEncoder::new(config.synthesis.sample_rate)?);
    let artifacts =
        Arc::new(FileArtifactStorage::new(&config.storage.output_dir, encoder.extension()).await?);

    // 推理引擎：由 worker 独占，上层只持有句柄
    let engine = build_engine(&config)?;
    let worker_config = InferWorkerConfig {
        queue_size: config.engine.queue_size,
        chunk_buffer: config.engine.chunk_buffer,
        health_retry: config.engine.health_retry(),
    };
    let (worker, engine_handle) = InferWorker::new(engine, worker_config);
    tokio::spawn(worker.run());

    let settings = SynthesisSettings {
        default_voice: config.synthesis.default_voice.clone(),
        max_output_files: config.storage.max_output_files,
        timeout: config.synthesis.timeout(),
    };
    let state = AppState::new(
        voice_store,
        Arc::new(engine_handle),
        encoder,
        artifacts,
        settings,
        config.server.base_url.clone(),
        config.server.public_base_url(),
    );

    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_size(config.storage.max_upload_size);
    let server = HttpServer::new(server_config, state);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
