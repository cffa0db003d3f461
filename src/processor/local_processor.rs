use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::Classifier;
use crate::IngestQueue;
use crate::ProcessorConfig;
use crate::Result;
use crate::ResultRecord;

/// Turns queued inputs into result records, strictly in insertion order.
pub struct LocalProcessor<Q, C>
where
    Q: IngestQueue,
    C: Classifier,
{
    queue: Arc<Q>,
    classifier: C,
    model_version: String,
    batch_size: usize,
    poll_interval: Duration,
    /// Sequence number of the last input with a written result
    cursor: Option<u64>,
}

impl<Q, C> LocalProcessor<Q, C>
where
    Q: IngestQueue,
    C: Classifier,
{
    pub fn new(
        queue: Arc<Q>,
        classifier: C,
        config: &ProcessorConfig,
    ) -> Self {
        Self {
            queue,
            classifier,
            model_version: config.model_version.clone(),
            batch_size: config.batch_size.max(1),
            poll_interval: config.poll_interval(),
            cursor: None,
        }
    }

    /// Starts after input `seq`, skipping everything at or before it.
    pub fn with_cursor(
        mut self,
        seq: u64,
    ) -> Self {
        self.cursor = Some(seq);
        self
    }

    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// Drains up to one batch of pending inputs and returns how many results
    /// were written.
    ///
    /// On a write failure the cursor stays on the last written input, so the
    /// failed one is retried by the next drain.
    pub async fn process_pending(&mut self) -> Result<usize> {
        let pending = self.queue.pending(self.cursor, self.batch_size).await?;
        let mut written = 0;

        for queued in pending {
            let classification = self.classifier.classify(&queued.doc.body);
            let result = ResultRecord::new(
                &queued.doc,
                classification.label,
                classification.confidence,
                self.model_version.as_str(),
            );
            let id = self.queue.record_result(result).await?;
            debug!(
                seq = queued.seq,
                source = %queued.doc.id,
                result = %id,
                label = %classification.label,
                "result written"
            );
            self.cursor = Some(queued.seq);
            written += 1;
        }

        Ok(written)
    }

    /// Drains the queue every poll interval until `cancel` fires.
    pub async fn run(
        mut self,
        cancel: CancellationToken,
    ) {
        let mut tick = interval(self.poll_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(model = %self.model_version, "local processor started");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(cursor = ?self.cursor, "local processor stopped");
                    return;
                }
                _ = tick.tick() => {
                    match self.process_pending().await {
                        Ok(0) => {}
                        Ok(n) => info!(processed = n, "processed pending inputs"),
                        Err(e) => warn!("processing pending inputs failed: {}", e),
                    }
                }
            }
        }
    }
}
