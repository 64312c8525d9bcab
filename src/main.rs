use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use postcast_backend::controllers::{queue::QueueController, stats::StatsController};
use postcast_backend::domain::processing::{
    spawn_scheduler, BatchProcessor, ProcessorSettings, RetryPolicy, SchedulerSettings,
};
use postcast_backend::domain::queue::{QueueService, QueueStore};
use postcast_backend::domain::stats::StatsService;
use postcast_backend::domain::tts::{
    EngineRegistry, TtsService, VoiceSettings, DEFAULT_ENGINE_ALIAS,
};
use postcast_backend::infrastructure::config::{Config, LogFormat};
use postcast_backend::infrastructure::http::{build_router, start_http_server};
use postcast_backend::infrastructure::repositories::{
    FsAudioRepository, MockTtsRepository, OpenAiTtsRepository, PollyTtsRepository,
    QueueSnapshotRepository, RedditContentRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting Postcast Backend on {}:{}",
        config.host,
        config.port
    );

    let config = Arc::new(config);
    let shutdown = CancellationToken::new();

    // Queue store, restored from the last snapshot when configured
    let store = Arc::new(QueueStore::new());
    let snapshot_repo = config
        .queue_snapshot_path
        .as_ref()
        .map(|path| QueueSnapshotRepository::new(path.clone()));
    if let Some(snapshot_repo) = &snapshot_repo {
        match snapshot_repo.load().await {
            Ok(Some(snapshot)) => {
                let restored = store.restore(snapshot);
                tracing::info!(restored = restored, "Queue restored from snapshot");
            }
            Ok(None) => tracing::info!("No queue snapshot found, starting empty"),
            Err(e) => tracing::error!(error = %e, "Failed to load queue snapshot, starting empty"),
        }
    }

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories
    tracing::info!("Instantiating repositories...");
    let content_repo = Arc::new(RedditContentRepository::new(
        config.reddit_base_url.clone(),
        config.reddit_user_agent.clone(),
        config.content_cache_enabled,
        config.skip_nsfw,
    ));
    let audio_repo = Arc::new(FsAudioRepository::new(config.audio_output_dir.clone()));
    tracing::info!(
        output_dir = %audio_repo.output_dir().display(),
        "Audio artifacts will be written to disk"
    );

    // 2. Register speech engines
    let registry = build_engine_registry(&config).await;
    if registry.resolve_name(DEFAULT_ENGINE_ALIAS).is_none() {
        tracing::warn!(
            default_engine = %config.default_tts_engine,
            engines = ?registry.names(),
            "Default TTS engine is not registered, requests for 'default' will be rejected"
        );
    }

    // 3. Instantiate services
    tracing::info!("Instantiating services...");
    let tts_service = Arc::new(TtsService::new(
        registry,
        VoiceSettings {
            voice: config.tts_voice.clone(),
            speed: config.tts_speed,
        },
        config.tts_cache_enabled,
    ));
    let queue_service = Arc::new(QueueService::new(store.clone(), content_repo.clone()));
    let stats_service = Arc::new(StatsService::new(store.clone()));
    let processor = Arc::new(BatchProcessor::new(
        store.clone(),
        content_repo,
        tts_service.clone(),
        audio_repo,
        ProcessorSettings {
            max_concurrency: config.process_max_concurrency,
            item_timeout: config.item_timeout(),
            retry: RetryPolicy::new(
                config.retry_max_attempts,
                Duration::from_millis(config.retry_base_delay_ms),
                Duration::from_millis(config.retry_max_delay_ms),
            ),
        },
        shutdown.clone(),
    ));

    // 4. Instantiate controllers
    tracing::info!("Instantiating controllers...");
    let queue_controller = Arc::new(QueueController::new(queue_service, processor.clone()));
    let stats_controller = Arc::new(StatsController::new(stats_service));

    // Optional background processing
    let scheduler = config.process_interval().map(|interval| {
        spawn_scheduler(
            processor.clone(),
            SchedulerSettings {
                interval,
                batch_size: config.process_batch_size,
                engine: DEFAULT_ENGINE_ALIAS.to_string(),
            },
            shutdown.clone(),
        )
    });

    // Ctrl-C stops new work and interrupts in-flight items
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        tracing::info!("Shutdown signal received");
        signal_token.cancel();
    });

    // Start HTTP server with all routes
    let app = build_router(tts_service, queue_controller, stats_controller);
    start_http_server(config.clone(), app, shutdown.clone()).await?;

    if let Some(handle) = scheduler {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Processing scheduler ended abnormally");
        }
    }

    if let Some(snapshot_repo) = &snapshot_repo {
        snapshot_repo.save(&store.snapshot()).await?;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn build_engine_registry(config: &Config) -> EngineRegistry {
    let mut registry = EngineRegistry::new(config.default_tts_engine.clone())
        .register("mock", Arc::new(MockTtsRepository::new()));

    if let Some(api_key) = &config.openai_api_key {
        let client = OpenAIClient::with_config(OpenAIConfig::new().with_api_key(api_key.clone()));
        registry = registry.register(
            "openai",
            Arc::new(OpenAiTtsRepository::new(
                Arc::new(client),
                config.openai_tts_model.clone(),
                config.openai_tts_voice.clone(),
            )),
        );
        tracing::info!(model = %config.openai_tts_model, "OpenAI TTS engine registered");
    }

    if config.polly_enabled {
        tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

        let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
        let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
        if !has_access_key || !has_secret_key {
            tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
        }

        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        let polly_client = aws_sdk_polly::Client::new(&aws_config);
        registry = registry.register("polly", Arc::new(PollyTtsRepository::new(Arc::new(polly_client))));
        tracing::info!(region = ?aws_config.region(), "AWS Polly TTS engine registered");
    }

    tracing::info!(
        engines = ?registry.names(),
        default_engine = %registry.default_engine(),
        "TTS engines ready"
    );
    registry
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "postcast_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "postcast_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
