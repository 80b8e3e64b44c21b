//! Inference Worker - 独占引擎的后台任务处理器
//!
//! 引擎不保证可重入，所有调用都经由队列交给唯一的 worker 顺序执行。
//! `EngineHandle` 实现同一个 `TtsEnginePort`，上层无需感知串行化

use async_trait::async_trait;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

use crate::application::ports::{EngineError, InferRequest, SampleChunkStream, TtsEnginePort};
use crate::domain::voice::EncodedReference;

type ChunkSender = mpsc::Sender<Result<Vec<f32>, EngineError>>;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct InferWorkerConfig {
    /// 任务队列容量
    pub queue_size: usize,
    /// 每个合成请求的采样块缓冲数
    pub chunk_buffer: usize,
    /// 健康检查失败后的重试间隔
    pub health_retry: Duration,
}

impl Default for InferWorkerConfig {
    fn default() -> Self {
        Self {
            queue_size: 64,
            chunk_buffer: 16,
            health_retry: Duration::from_secs(2),
        }
    }
}

/// 队列中的任务
enum EngineJob {
    Encode {
        audio_path: PathBuf,
        reply: oneshot::Sender<Result<EncodedReference, EngineError>>,
    },
    Synthesize {
        request: InferRequest,
        started: oneshot::Sender<Result<(), EngineError>>,
        chunks: ChunkSender,
    },
}

/// 推理 Worker
pub struct InferWorker {
    config: InferWorkerConfig,
    engine: Arc<dyn TtsEnginePort>,
    queue_receiver: mpsc::Receiver<EngineJob>,
    ready: Arc<AtomicBool>,
}

impl InferWorker {
    /// 创建 worker 及其前端句柄
    pub fn new(engine: Arc<dyn TtsEnginePort>, config: InferWorkerConfig) -> (Self, EngineHandle) {
        let (sender, queue_receiver) = mpsc::channel(config.queue_size.max(1));
        let ready = Arc::new(AtomicBool::new(false));

        let handle = EngineHandle {
            sender,
            ready: ready.clone(),
            model: engine.model_name(),
            chunk_buffer: config.chunk_buffer.max(1),
        };
        let worker = Self {
            config,
            engine,
            queue_receiver,
            ready,
        };
        (worker, handle)
    }

    /// 启动 Worker：先等待引擎就绪，再顺序消费任务
    pub async fn run(mut self) {
        tracing::info!(model = %self.engine.model_name(), "InferWorker started, waiting for engine");

        let start = Instant::now();
        while !self.engine.health_check().await {
            tracing::warn!(
                retry_in_ms = self.config.health_retry.as_millis() as u64,
                "Engine not ready"
            );
            tokio::time::sleep(self.config.health_retry).await;
        }
        self.ready.store(true, Ordering::SeqCst);
        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Engine ready"
        );

        while let Some(job) = self.queue_receiver.recv().await {
            match job {
                EngineJob::Encode { audio_path, reply } => {
                    let result = self.engine.encode_reference(&audio_path).await;
                    let _ = reply.send(result);
                }
                EngineJob::Synthesize {
                    request,
                    started,
                    chunks,
                } => {
                    self.process_synthesis(request, started, chunks).await;
                }
            }
        }

        self.ready.store(false, Ordering::SeqCst);
        tracing::info!("InferWorker stopped");
    }

    /// 处理单个合成任务，接收方断开即停止拉取
    async fn process_synthesis(
        &self,
        request: InferRequest,
        started: oneshot::Sender<Result<(), EngineError>>,
        chunks: ChunkSender,
    ) {
        let voice = request.voice.clone();
        let mut stream = match self.engine.infer_stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                let _ = started.send(Err(e));
                return;
            }
        };
        if started.send(Ok(())).is_err() {
            tracing::debug!(voice = %voice, "Synthesis abandoned before start");
            return;
        }

        let mut sent = 0usize;
        while let Some(item) = stream.next().await {
            let failed = item.is_err();
            if chunks.send(item).await.is_err() {
                tracing::info!(voice = %voice, chunks = sent, "Consumer went away, synthesis cancelled");
                return;
            }
            sent += 1;
            if failed {
                break;
            }
        }
        tracing::debug!(voice = %voice, chunks = sent, "Synthesis job finished");
    }
}

/// 引擎句柄
///
/// 可克隆；引擎就绪前所有调用返回 `EngineError::NotReady`
#[derive(Clone)]
pub struct EngineHandle {
    sender: mpsc::Sender<EngineJob>,
    ready: Arc<AtomicBool>,
    model: String,
    chunk_buffer: usize,
}

impl EngineHandle {
    fn ensure_ready(&self) -> Result<(), EngineError> {
        if self.ready.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(EngineError::NotReady)
        }
    }

    async fn submit(&self, job: EngineJob) -> Result<(), EngineError> {
        self.sender
            .send(job)
            .await
            .map_err(|_| EngineError::WorkerStopped)
    }
}

#[async_trait]
impl TtsEnginePort for EngineHandle {
    async fn encode_reference(&self, audio_path: &Path) -> Result<EncodedReference, EngineError> {
        self.ensure_ready()?;

        let (reply, rx) = oneshot::channel();
        self.submit(EngineJob::Encode {
            audio_path: audio_path.to_path_buf(),
            reply,
        })
        .await?;

        rx.await.map_err(|_| EngineError::WorkerStopped)?
    }

    async fn infer_stream(&self, request: InferRequest) -> Result<SampleChunkStream, EngineError> {
        self.ensure_ready()?;

        let (started, started_rx) = oneshot::channel();
        let (chunks, chunks_rx) = mpsc::channel(self.chunk_buffer);
        self.submit(EngineJob::Synthesize {
            request,
            started,
            chunks,
        })
        .await?;

        started_rx.await.map_err(|_| EngineError::WorkerStopped)??;

        let stream = futures_util::stream::unfold(chunks_rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(stream.boxed())
    }

    async fn health_check(&self) -> bool {
        self.is_ready()
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn model_name(&self) -> String {
        self.model.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::voice::{ReferenceText, VoiceName};
    use std::sync::atomic::AtomicUsize;

    /// 记录并发度和已产出块数的引擎
    #[derive(Default)]
    struct ProbeEngine {
        in_flight: Arc<AtomicUsize>,
        max_in_flight: Arc<AtomicUsize>,
        pulled: Arc<AtomicUsize>,
        healthy_after: usize,
        health_calls: AtomicUsize,
        chunks: usize,
    }

    #[async_trait]
    impl TtsEnginePort for ProbeEngine {
        async fn encode_reference(&self, _audio_path: &Path) -> Result<EncodedReference, EngineError> {
            Ok(EncodedReference::new(vec![7]))
        }

        async fn infer_stream(&self, _request: InferRequest) -> Result<SampleChunkStream, EngineError> {
            let in_flight = self.in_flight.clone();
            let max_in_flight = self.max_in_flight.clone();
            let pulled = self.pulled.clone();
            let chunks = self.chunks;

            let stream = async_stream::stream! {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                max_in_flight.fetch_max(now, Ordering::SeqCst);
                for _ in 0..chunks {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    pulled.fetch_add(1, Ordering::SeqCst);
                    yield Ok::<_, EngineError>(vec![0.1; 8]);
                }
                in_flight.fetch_sub(1, Ordering::SeqCst);
            };
            Ok(stream.boxed())
        }

        async fn health_check(&self) -> bool {
            self.health_calls.fetch_add(1, Ordering::SeqCst) >= self.healthy_after
        }

        fn model_name(&self) -> String {
            "probe".to_string()
        }
    }

    fn request() -> InferRequest {
        InferRequest {
            text: "hello".to_string(),
            encoded_reference: EncodedReference::new(vec![1]),
            reference_text: ReferenceText::new("ref").unwrap(),
            voice: VoiceName::parse("dave").unwrap(),
        }
    }

    fn config() -> InferWorkerConfig {
        InferWorkerConfig {
            queue_size: 8,
            chunk_buffer: 1,
            health_retry: Duration::from_millis(5),
        }
    }

    async fn wait_ready(handle: &EngineHandle) {
        for _ in 0..200 {
            if handle.is_ready() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("engine never became ready");
    }

    #[tokio::test]
    async fn test_not_ready_until_health_check_passes() {
        let engine = Arc::new(ProbeEngine {
            healthy_after: 3,
            chunks: 1,
            ..Default::default()
        });
        let (worker, handle) = InferWorker::new(engine, config());

        assert!(matches!(
            handle.infer_stream(request()).await,
            Err(EngineError::NotReady)
        ));

        tokio::spawn(worker.run());
        wait_ready(&handle).await;

        let encoded = handle.encode_reference(Path::new("unused.wav")).await.unwrap();
        assert_eq!(encoded.as_bytes().to_vec(), vec![7u8]);
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_serialized() {
        let engine = Arc::new(ProbeEngine {
            chunks: 5,
            ..Default::default()
        });
        let max_in_flight = engine.max_in_flight.clone();
        let (worker, handle) = InferWorker::new(engine, config());
        tokio::spawn(worker.run());
        wait_ready(&handle).await;

        let mut tasks = Vec::new();
        for _ in 0..3 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                let stream = handle.infer_stream(request()).await.unwrap();
                stream.collect::<Vec<_>>().await.len()
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap(), 5);
        }

        assert_eq!(max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dropped_consumer_stops_engine() {
        let engine = Arc::new(ProbeEngine {
            chunks: 200,
            ..Default::default()
        });
        let pulled = engine.pulled.clone();
        let (worker, handle) = InferWorker::new(engine, config());
        tokio::spawn(worker.run());
        wait_ready(&handle).await;

        let mut stream = handle.infer_stream(request()).await.unwrap();
        assert!(stream.next().await.is_some());
        drop(stream);

        // worker 放弃当前任务后应能继续处理下一个
        let encoded = handle.encode_reference(Path::new("unused.wav")).await.unwrap();
        assert!(!encoded.is_empty());
        assert!(pulled.load(Ordering::SeqCst) < 10);
    }
}
