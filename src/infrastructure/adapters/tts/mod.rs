//! TTS Adapter - 推理引擎实现
//!
//! - `HttpTtsClient`: 调用独立部署的推理服务
//! - `FakeTtsEngine`: 开发和测试用的确定性引擎

mod fake_tts_engine;
mod http_tts_client;

pub use fake_tts_engine::{FakeTtsEngine, FakeTtsEngineConfig};
pub use http_tts_client::{HttpTtsClient, HttpTtsClientConfig};
