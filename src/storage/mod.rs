//! Store contracts used by the watcher, the producer and the local processor.
//!
//! Each role depends on the narrowest trait it needs: the completion watcher
//! only ever counts results, it never reads or writes them.

mod adaptors;
mod model;


pub use adaptors::*;
pub use model::*;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::StoreResult;

/// Counting contract of the result store.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResultStore: Send + Sync + 'static {
    /// Total number of result records visible to a consistent read.
    async fn current_count(&self) -> StoreResult<u64>;
}

/// Read access to results for reporting.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResultReader: Send + Sync + 'static {
    /// Newest results first, at most `limit` of them.
    async fn recent(
        &self,
        limit: usize,
    ) -> StoreResult<Vec<Document<ResultRecord>>>;
}

/// Upstream store receiving submitted records.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InputStore: Send + Sync + 'static {
    async fn insert(
        &self,
        record: InputRecord,
    ) -> StoreResult<RecordId>;

    async fn count(&self) -> StoreResult<u64>;
}

/// What a processing stage needs: read submitted inputs in insertion order and
/// write results back.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IngestQueue: Send + Sync + 'static {
    /// Inputs strictly after `after` (all inputs when `None`), oldest first.
    async fn pending(
        &self,
        after: Option<u64>,
        limit: usize,
    ) -> StoreResult<Vec<QueuedInput>>;

    /// Sequence number of the newest input, `None` when nothing was inserted.
    async fn last_seq(&self) -> StoreResult<Option<u64>>;

    async fn record_result(
        &self,
        result: ResultRecord,
    ) -> StoreResult<RecordId>;
}
