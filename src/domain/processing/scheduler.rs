use super::processor::BatchProcessorApi;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periodic processing pass settings.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    pub interval: Duration,
    pub batch_size: usize,
    pub engine: String,
}

/// Run `process_batch` every `interval` until `shutdown` is cancelled.
///
/// A pass that is still running when the next tick is due delays that tick
/// instead of stacking passes.
pub fn spawn_scheduler(
    processor: Arc<dyn BatchProcessorApi>,
    settings: SchedulerSettings,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = interval(settings.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately
        timer.tick().await;

        tracing::info!(
            interval_secs = settings.interval.as_secs(),
            batch_size = settings.batch_size,
            engine = %settings.engine,
            "Processing scheduler started"
        );

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = timer.tick() => {
                    match processor.process_batch(settings.batch_size, &settings.engine).await {
                        Ok(summary) if summary.processed > 0 => {
                            tracing::info!(
                                processed = summary.processed,
                                successful = summary.successful,
                                failed = summary.failed,
                                "Scheduled batch finished"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!(error = %e, "Scheduled batch rejected");
                        }
                    }
                }
            }
        }

        tracing::info!("Processing scheduler stopped");
    })
}
