//! Submits input records upstream one at a time.

mod samples;

pub use samples::*;


use std::sync::Arc;
use std::time::Duration;

use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;

use crate::InputRecord;
use crate::InputStore;
use crate::RecordId;

/// Outcome of submitting a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Ids of accepted records, in submission order
    pub inserted: Vec<RecordId>,
    /// `(1-based position in batch, error)` for rejected records
    pub failures: Vec<(u32, String)>,
    /// Set when the batch was cut short by cancellation
    pub cancelled: bool,
}

impl BatchReport {
    pub fn inserted_count(&self) -> u64 {
        self.inserted.len() as u64
    }
}

pub struct Producer<S: InputStore> {
    store: Arc<S>,
}

impl<S: InputStore> Producer<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Inserts `records` in order, pausing `pace` between two inserts.
    ///
    /// A rejected insert is logged and recorded; the rest of the batch is
    /// still submitted. Cancellation is honoured between inserts.
    pub async fn insert_batch(
        &self,
        records: Vec<InputRecord>,
        pace: Duration,
        cancel: &CancellationToken,
    ) -> BatchReport {
        let total = records.len();
        let mut report = BatchReport::default();

        for (i, record) in records.into_iter().enumerate() {
            let position = (i + 1) as u32;
            if cancel.is_cancelled() {
                info!(submitted = i, total, "batch cancelled");
                report.cancelled = true;
                break;
            }

            let title = record.title.clone().unwrap_or_default();
            match self.store.insert(record).await {
                Ok(id) => {
                    info!(%id, position, %title, "added record");
                    report.inserted.push(id);
                }
                Err(e) => {
                    error!(position, "failed to add record: {}", e);
                    report.failures.push((position, e.to_string()));
                }
            }

            if i + 1 < total && !pace.is_zero() {
                select! {
                    _ = cancel.cancelled() => {}
                    _ = sleep(pace) => {}
                }
            }
        }

        info!(
            inserted = report.inserted.len(),
            failed = report.failures.len(),
            "batch submitted"
        );
        report
    }
}
