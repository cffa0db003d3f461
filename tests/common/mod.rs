use std::sync::Arc;

use pipeline_watch::IngestQueue;
use pipeline_watch::LexiconClassifier;
use pipeline_watch::LocalProcessor;
use pipeline_watch::PipelineConfig;
use pipeline_watch::StoreBackend;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const BATCH: usize = 10;

/// Default configuration with the given timings and an in-memory store.
pub fn check_config(
    pace_ms: u64,
    poll_interval_ms: u64,
    deadline_ms: u64,
) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.producer.pace_ms = pace_ms;
    config.producer.batch_size = BATCH;
    config.watch.poll_interval_ms = poll_interval_ms;
    config.watch.deadline_ms = deadline_ms;
    config.store.backend = StoreBackend::Memory;
    config
}

/// Runs the local processing stage until the returned token is cancelled.
pub fn start_processor<Q: IngestQueue>(
    queue: Arc<Q>,
    config: &PipelineConfig,
) -> (CancellationToken, JoinHandle<()>) {
    let stop = CancellationToken::new();
    let processor = LocalProcessor::new(queue, LexiconClassifier::new(), &config.processor);
    let handle = tokio::spawn(processor.run(stop.clone()));
    (stop, handle)
}
