use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;
use tracing::trace;

use crate::Document;
use crate::IngestQueue;
use crate::InputRecord;
use crate::InputStore;
use crate::QueuedInput;
use crate::RecordId;
use crate::ResultReader;
use crate::ResultRecord;
use crate::ResultStore;
use crate::StoreError;
use crate::StoreResult;

/// In-memory pipeline store holding both collections.
///
/// Besides the store contracts it publishes the result count on a watch
/// channel and lets tests inject count failures and deletions.
#[derive(Debug)]
pub struct MemStore {
    inputs: RwLock<BTreeMap<u64, Document<InputRecord>>>,
    results: RwLock<Vec<Document<ResultRecord>>>,
    next_seq: AtomicU64,
    result_count_tx: watch::Sender<u64>,

    failing_counts: AtomicUsize,
    offline: AtomicBool,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    pub fn new() -> Self {
        let (result_count_tx, _) = watch::channel(0);
        Self {
            inputs: RwLock::new(BTreeMap::new()),
            results: RwLock::new(Vec::new()),
            next_seq: AtomicU64::new(1),
            result_count_tx,
            failing_counts: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Change feed of the result count, updated on every write and removal.
    pub fn subscribe_results(&self) -> watch::Receiver<u64> {
        self.result_count_tx.subscribe()
    }

    /// The next `n` count queries fail with [`StoreError::Unavailable`].
    pub fn fail_next_counts(
        &self,
        n: usize,
    ) {
        self.failing_counts.store(n, Ordering::SeqCst);
    }

    /// While offline every count query fails.
    pub fn set_offline(
        &self,
        offline: bool,
    ) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Removes the `n` newest results, as another actor deleting documents would.
    pub fn remove_newest_results(
        &self,
        n: usize,
    ) {
        let mut results = self.results.write();
        let keep = results.len().saturating_sub(n);
        results.truncate(keep);
        self.result_count_tx.send_replace(results.len() as u64);
        debug!(removed = n, remaining = keep, "results removed");
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst)
    }

    fn check_count_fault(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".into()));
        }

        let injected = self
            .failing_counts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if injected.is_ok() {
            return Err(StoreError::Unavailable("injected count failure".into()));
        }

        Ok(())
    }
}

#[async_trait]
impl ResultStore for MemStore {
    async fn current_count(&self) -> StoreResult<u64> {
        self.check_count_fault()?;
        Ok(self.results.read().len() as u64)
    }
}

#[async_trait]
impl ResultReader for MemStore {
    async fn recent(
        &self,
        limit: usize,
    ) -> StoreResult<Vec<Document<ResultRecord>>> {
        let results = self.results.read();
        Ok(results.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait]
impl InputStore for MemStore {
    async fn insert(
        &self,
        record: InputRecord,
    ) -> StoreResult<RecordId> {
        let id = RecordId::generate();
        let seq = self.next_seq();
        trace!(%id, seq, "insert input");

        self.inputs.write().insert(
            seq,
            Document {
                id: id.clone(),
                body: record,
            },
        );
        Ok(id)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.inputs.read().len() as u64)
    }
}

#[async_trait]
impl IngestQueue for MemStore {
    async fn pending(
        &self,
        after: Option<u64>,
        limit: usize,
    ) -> StoreResult<Vec<QueuedInput>> {
        let start = after.map_or(0, |s| s.saturating_add(1));
        let inputs = self.inputs.read();
        Ok(inputs
            .range(start..)
            .take(limit)
            .map(|(seq, doc)| QueuedInput {
                seq: *seq,
                doc: doc.clone(),
            })
            .collect())
    }

    async fn last_seq(&self) -> StoreResult<Option<u64>> {
        Ok(self.inputs.read().last_key_value().map(|(seq, _)| *seq))
    }

    async fn record_result(
        &self,
        result: ResultRecord,
    ) -> StoreResult<RecordId> {
        let id = RecordId::generate();
        let mut results = self.results.write();
        results.push(Document {
            id: id.clone(),
            body: result,
        });
        self.result_count_tx.send_replace(results.len() as u64);
        Ok(id)
    }
}
