//! HTTP Routes
//!
//! API Endpoints:
//! - /                    GET     健康检查
//! - /voices              GET     列出所有音色
//! - /voices/add          POST    上传音色（multipart）
//! - /voices/{name}       GET     获取音色详情
//! - /voices/{name}       DELETE  删除音色
//! - /synthesize          POST    整文件合成，返回 audioUrl
//! - /synthesize/stream   POST    流式合成，分块返回 WAV
//! - /audio/{file}        GET     下载生成的音频

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::health))
        .merge(voice_routes())
        .merge(synthesis_routes())
        .route("/audio/:file_name", get(handlers::download_audio))
}

/// Voice 路由
fn voice_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/voices", get(handlers::list_voices))
        .route("/voices/add", post(handlers::add_voice))
        .route(
            "/voices/:name",
            get(handlers::get_voice).delete(handlers::delete_voice),
        )
}

/// Synthesis 路由
fn synthesis_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/synthesize", post(handlers::synthesize))
        .route("/synthesize/stream", post(handlers::synthesize_stream))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::SynthesisSettings;
    use crate::infrastructure::adapters::{
        FakeTtsEngine, FakeTtsEngineConfig, FileArtifactStorage, WavEncoder,
    };
    use crate::infrastructure::http::server::build_router;
    use crate::infrastructure::persistence::FileVoiceStore;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "voxserve-test-boundary";

    struct TestApp {
        _samples: TempDir,
        _output: TempDir,
        router: Router,
    }

    async fn app() -> TestApp {
        let samples = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let voice_store = Arc::new(FileVoiceStore::new(samples.path()).await.unwrap());
        let engine = Arc::new(FakeTtsEngine::new(FakeTtsEngineConfig::default()));
        let encoder = Arc::new(WavEncoder::new(24000).unwrap());
        let artifacts = Arc::new(FileArtifactStorage::new(output.path(), "wav").await.unwrap());

        let state = AppState::new(
            voice_store,
            engine,
            encoder,
            artifacts,
            SynthesisSettings::default(),
            None,
            "http://localhost:8001".to_string(),
        );

        TestApp {
            _samples: samples,
            _output: output,
            router: build_router(Arc::new(state), 1024 * 1024),
        }
    }

    fn multipart_body(name: &str, reference_text: &str, audio: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        for (field, value) in [("voice_name", name), ("reference_text", reference_text)] {
            body.extend(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n"
                )
                .into_bytes(),
            );
        }
        body.extend(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"audio_file\"; filename=\"ref.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
            )
            .into_bytes(),
        );
        body.extend_from_slice(audio);
        body.extend(format!("\r\n--{BOUNDARY}--\r\n").into_bytes());
        body
    }

    async fn add_voice(router: &Router, name: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/voices/add")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(name, "hello from jo", b"RIFF-ref-audio")))
            .unwrap();
        send(router, request).await
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn synthesize(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::HOST, "tts.local:8001")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_voice_lifecycle_and_synthesis() {
        let app = app().await;

        let (status, body) = add_voice(&app.router, "jo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let (status, body) = send(&app.router, get("/voices")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["voices"][0]["name"], "jo");
        assert_eq!(body["voices"][0]["hasAudio"], true);

        let (status, body) = send(
            &app.router,
            synthesize("/synthesize", serde_json::json!({"text": "Hello", "voice": "jo"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["voice"], "jo");
        assert!(body["durationSeconds"].as_f64().unwrap() > 0.0);
        let audio_url = body["audioUrl"].as_str().unwrap();
        assert!(audio_url.starts_with("http://tts.local:8001/audio/"));
        assert!(audio_url.ends_with(".wav"));

        let path = audio_url.trim_start_matches("http://tts.local:8001");
        let response = app.router.clone().oneshot(get(path)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");

        let request = Request::builder()
            .method("DELETE")
            .uri("/voices/jo")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");

        let (_, body) = send(&app.router, get("/voices")).await;
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn test_audio_url_uses_forwarded_scheme() {
        let app = app().await;
        add_voice(&app.router, "jo").await;

        let mut request = synthesize("/synthesize", serde_json::json!({"text": "Hello", "voice": "jo"}));
        request
            .headers_mut()
            .insert("x-forwarded-proto", "https".parse().unwrap());
        let (status, body) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["audioUrl"]
            .as_str()
            .unwrap()
            .starts_with("https://tts.local:8001/audio/"));
    }

    #[tokio::test]
    async fn test_stream_sends_wav_headers() {
        let app = app().await;
        add_voice(&app.router, "jo").await;

        let response = app
            .router
            .clone()
            .oneshot(synthesize(
                "/synthesize/stream",
                serde_json::json!({"text": "Hi there", "voice": "jo"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=\"jo_stream.wav\""
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        // "Hi there" 8 个字符，每字符 1200 个 16-bit 采样
        assert_eq!(bytes.len(), 44 + 8 * 1200 * 2);
    }

    #[tokio::test]
    async fn test_rejections_use_real_status_codes() {
        let app = app().await;
        add_voice(&app.router, "jo").await;

        let (status, body) = send(
            &app.router,
            synthesize("/synthesize", serde_json::json!({"text": "   ", "voice": "jo"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errno"], 400);

        let (status, body) = send(
            &app.router,
            synthesize("/synthesize", serde_json::json!({"text": "Hello", "voice": "nobody"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errno"], 404);

        let (status, body) = add_voice(&app.router, "jo").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errno"], 409);

        let (status, _) = add_voice(&app.router, "jo 2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .method("DELETE")
            .uri("/voices/nobody")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app.router, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app.router, get("/audio/not-an-artifact.wav")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_reports_voices() {
        let app = app().await;
        add_voice(&app.router, "jo").await;

        let (status, body) = send(&app.router, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "fake-tone");
        assert_eq!(body["availableVoices"], serde_json::json!(["jo"]));
        assert_eq!(body["defaultVoice"], "dave");
    }
}
