use postcast_backend::controllers::{queue::QueueController, stats::StatsController};
use postcast_backend::domain::processing::{BatchProcessor, ProcessorSettings, RetryPolicy};
use postcast_backend::domain::queue::{QueueService, QueueStore};
use postcast_backend::domain::stats::StatsService;
use postcast_backend::domain::tts::{EngineRegistry, TtsService, VoiceSettings};
use postcast_backend::infrastructure::http::build_router;
use postcast_backend::infrastructure::repositories::MockTtsRepository;
use std::sync::Arc;
use std::time::Duration;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub mod api_client;
pub mod stubs;

use api_client::TestClient;
use stubs::{FixedAudioRepository, RejectingTtsRepository, StubContentRepository};

/// A running server backed by an in-memory queue and stub collaborators.
///
/// Engines: `mock` (default) always succeeds, `rejecting` refuses every input.
pub struct TestContext {
    pub client: TestClient,
    #[allow(dead_code)]
    pub store: Arc<QueueStore>,
    shutdown: CancellationToken,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let store = Arc::new(QueueStore::new());
            let shutdown = CancellationToken::new();
            let content_repo = Arc::new(StubContentRepository);

            let registry = EngineRegistry::new("mock")
                .register("mock", Arc::new(MockTtsRepository::new()))
                .register("rejecting", Arc::new(RejectingTtsRepository));
            let tts_service = Arc::new(TtsService::new(registry, VoiceSettings::default(), false));

            let processor = Arc::new(BatchProcessor::new(
                store.clone(),
                content_repo.clone(),
                tts_service.clone(),
                Arc::new(FixedAudioRepository),
                ProcessorSettings {
                    max_concurrency: 3,
                    item_timeout: Duration::from_secs(5),
                    retry: RetryPolicy::new(2, Duration::from_millis(1), Duration::from_millis(5)),
                },
                shutdown.clone(),
            ));

            let queue_service = Arc::new(QueueService::new(store.clone(), content_repo));
            let stats_service = Arc::new(StatsService::new(store.clone()));
            let app = build_router(
                tts_service,
                Arc::new(QueueController::new(queue_service, processor)),
                Arc::new(StatsController::new(stats_service)),
            );

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            let server_token = shutdown.clone();
            tokio::spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move { server_token.cancelled().await })
                    .await
                    .unwrap();
            });

            // Wait for server to be ready
            tokio::time::sleep(Duration::from_millis(50)).await;

            Self {
                client: TestClient::new(&base_url),
                store,
                shutdown,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            self.shutdown.cancel();
        }
    }
}
