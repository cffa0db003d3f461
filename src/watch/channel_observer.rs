use std::time::Duration;

use async_trait::async_trait;
use tokio::select;
use tokio::sync::watch;
use tokio::time::sleep;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::CompletionObserver;
use super::WatchOutcome;
use super::WatchSession;
use crate::Error;
use crate::Result;
use crate::StoreError;

/// Completion observer fed by pushed count updates (a change feed) instead
/// of polling.
///
/// `poll_interval` still bounds how long it waits between two reads of the
/// latest value, so a quiet feed cannot hold it past the deadline.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    counts: watch::Receiver<u64>,
}

impl ChannelObserver {
    pub fn new(counts: watch::Receiver<u64>) -> Self {
        Self { counts }
    }
}

#[async_trait]
impl CompletionObserver for ChannelObserver {
    async fn start_session(
        &self,
        expected_new_count: u64,
        deadline: Duration,
        poll_interval: Duration,
    ) -> Result<WatchSession> {
        let baseline = *self.counts.borrow();
        info!(baseline, expected_new_count, "feed watch session started");
        WatchSession::new(baseline, expected_new_count, deadline, poll_interval)
    }

    async fn await_completion(
        &self,
        session: &mut WatchSession,
        cancel: &CancellationToken,
    ) -> Result<WatchOutcome> {
        if session.is_done() {
            return Ok(session.completed());
        }

        let mut rx = self.counts.clone();
        let deadline_at = Instant::now() + session.deadline();
        loop {
            let count = *rx.borrow_and_update();
            let snapshot = session.observe(count);
            debug!(new_count = snapshot.new_count, "feed update observed");
            if snapshot.done {
                return Ok(session.completed());
            }

            let now = Instant::now();
            if now >= deadline_at {
                warn!(
                    "Timeout reached. Only {}/{} results received",
                    snapshot.new_count,
                    session.expected_new_count()
                );
                return Ok(session.timed_out());
            }

            let pause = session.poll_interval().min(deadline_at - now);
            select! {
                biased;
                _ = cancel.cancelled() => return Ok(session.cancelled()),
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Err(Error::StoreUnavailable {
                            attempts: 1,
                            source: StoreError::Unavailable("count feed closed".into()),
                        });
                    }
                }
                _ = sleep(pause) => {}
            }
        }
    }
}
