//! Shared helpers for unit tests.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tokio::time::Instant;

use crate::MemStore;
use crate::ResultStore;
use crate::StoreResult;

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

type CountFn = Box<dyn Fn(Duration) -> u64 + Send + Sync>;

/// Result store whose count is a function of the time elapsed since it was
/// created. Meant for paused-clock tests.
pub(crate) struct TimedStore {
    start: Instant,
    count_at: CountFn,
    latency: Duration,
}

impl TimedStore {
    pub(crate) fn new(count_at: impl Fn(Duration) -> u64 + Send + Sync + 'static) -> Self {
        Self {
            start: Instant::now(),
            count_at: Box::new(count_at),
            latency: Duration::ZERO,
        }
    }

    /// Every count query takes `latency` before answering.
    pub(crate) fn with_latency(
        mut self,
        latency: Duration,
    ) -> Self {
        self.latency = latency;
        self
    }
}

#[async_trait]
impl ResultStore for TimedStore {
    async fn current_count(&self) -> StoreResult<u64> {
        if !self.latency.is_zero() {
            sleep(self.latency).await;
        }
        Ok((self.count_at)(self.start.elapsed()))
    }
}

/// Writes `n` processed results into `store`, one input each.
pub(crate) async fn add_results(
    store: &Arc<MemStore>,
    n: usize,
) {
    use crate::IngestQueue;
    use crate::InputRecord;
    use crate::InputStore;
    use crate::ResultRecord;
    use crate::Sentiment;

    let before = store.last_seq().await.unwrap();
    for _ in 0..n {
        store.insert(InputRecord::new("generated")).await.unwrap();
    }
    for queued in store.pending(before, n).await.unwrap() {
        store
            .record_result(ResultRecord::new(&queued.doc, Sentiment::Unknown, 0.5, "test"))
            .await
            .unwrap();
    }
}
