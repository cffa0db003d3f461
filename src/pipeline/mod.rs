//! End-to-end check of an eventually consistent pipeline: submit a batch,
//! watch for its results, report.


use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::warn;

use crate::CompletionObserver;
use crate::CompletionWatcher;
use crate::CountSummary;
use crate::Error;
use crate::InputRecord;
use crate::InputStore;
use crate::PipelineConfig;
use crate::PipelineReport;
use crate::Producer;
use crate::ResultReader;
use crate::ResultStore;
use crate::StoreResult;
use crate::WatchOutcome;

/// Store facade a pipeline check needs.
pub trait PipelineStore: InputStore + ResultStore + ResultReader {}

impl<T> PipelineStore for T where T: InputStore + ResultStore + ResultReader {}

pub struct PipelineCheck<S: PipelineStore> {
    store: Arc<S>,
    observer: Arc<dyn CompletionObserver>,
    producer: Producer<S>,
    config: PipelineConfig,
}

impl<S: PipelineStore> PipelineCheck<S> {
    /// Watches completion by polling `store` with the configured retry policy.
    pub fn new(
        store: Arc<S>,
        config: PipelineConfig,
    ) -> Self {
        let observer = Arc::new(CompletionWatcher::new(store.clone(), config.retry));
        Self {
            producer: Producer::new(store.clone()),
            store,
            observer,
            config,
        }
    }

    pub fn with_observer(
        mut self,
        observer: Arc<dyn CompletionObserver>,
    ) -> Self {
        self.observer = observer;
        self
    }

    /// Runs one check. Never fails: every problem, including an unreachable
    /// store, ends up in the returned report.
    pub async fn run(
        &self,
        correlation_id: &str,
        records: Vec<InputRecord>,
        cancel: &CancellationToken,
    ) -> PipelineReport {
        let started = Instant::now();
        let planned = records.len() as u64;
        let initial = self.read_counts().await;
        if let Err(e) = &initial {
            warn!("reading initial counts failed: {}", e);
        }

        let mut report = PipelineReport {
            correlation_id: correlation_id.to_string(),
            batch: Default::default(),
            outcome: Ok(WatchOutcome::Completed { new_count: 0 }),
            counts: None,
            results: vec![],
            elapsed: Default::default(),
        };

        // baseline before the first insert, so fast results are not missed
        let watch = &self.config.watch;
        let mut session = match self
            .observer
            .start_session(planned, watch.deadline(), watch.poll_interval())
            .await
        {
            Ok(session) => session,
            Err(e) => {
                warn!("cannot start watch session: {}", e);
                report.outcome = Err(e);
                report.elapsed = started.elapsed();
                return report;
            }
        };

        info!(correlation_id, planned, "submitting batch");
        report.batch = self
            .producer
            .insert_batch(records, self.config.producer.pace(), cancel)
            .await;
        let inserted = report.batch.inserted_count();
        session.revise_expected(inserted);

        report.outcome = if report.batch.cancelled {
            Ok(WatchOutcome::Cancelled {
                new_count: session.new_count(),
                expected: session.expected_new_count(),
            })
        } else if inserted == 0 && planned > 0 {
            Err(Error::Fatal("no record of the batch was accepted".to_string()))
        } else {
            self.observer.await_completion(&mut session, cancel).await
        };
        info!(
            correlation_id,
            new_results = session.new_count(),
            expected = inserted,
            polls = session.polls(),
            "watch finished"
        );

        if matches!(report.outcome, Ok(WatchOutcome::Completed { .. })) && inserted > 0 {
            match self.store.recent(inserted as usize).await {
                Ok(results) => report.results = results,
                Err(e) => warn!("listing results failed: {}", e),
            }
        }

        report.counts = match (initial, self.read_counts().await) {
            (Ok((ib, rb)), Ok((ia, ra))) => Some(CountSummary {
                incoming: (ib, ia),
                results: (rb, ra),
                submitted: inserted,
            }),
            (_, Err(e)) => {
                warn!("reading final counts failed: {}", e);
                None
            }
            _ => None,
        };
        report.elapsed = started.elapsed();
        report
    }

    /// (incoming, results)
    async fn read_counts(&self) -> StoreResult<(u64, u64)> {
        let incoming = InputStore::count(&*self.store).await?;
        let results = self.store.current_count().await?;
        Ok((incoming, results))
    }
}
