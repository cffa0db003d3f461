use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::select;
use tokio::time::sleep;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::count_with_retry;
use super::validate_session_params;
use super::CompletionObserver;
use super::PollSnapshot;
use super::WatchOutcome;
use super::WatchSession;
use crate::Result;
use crate::ResultStore;
use crate::RetryPolicy;

/// Polling completion observer over a [`ResultStore`].
///
/// Holds no per-session state, so one watcher may run several sessions
/// against the same store; each keeps its own baseline.
pub struct CompletionWatcher<S: ResultStore> {
    store: Arc<S>,
    retry: RetryPolicy,
}

impl<S: ResultStore> std::fmt::Debug for CompletionWatcher<S> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("CompletionWatcher").field("retry", &self.retry).finish()
    }
}

impl<S: ResultStore> CompletionWatcher<S> {
    pub fn new(
        store: Arc<S>,
        retry: RetryPolicy,
    ) -> Self {
        Self { store, retry }
    }

    /// Validates parameters, then captures the baseline count (with retry).
    pub async fn start_session(
        &self,
        expected_new_count: u64,
        deadline: Duration,
        poll_interval: Duration,
    ) -> Result<WatchSession> {
        validate_session_params(poll_interval)?;

        let baseline = count_with_retry(&*self.store, &self.retry).await?;
        info!(
            baseline,
            expected_new_count,
            ?deadline,
            ?poll_interval,
            "watch session started"
        );
        WatchSession::new(baseline, expected_new_count, deadline, poll_interval)
    }

    /// One count query, no retry and no sleep.
    ///
    /// A failed query leaves the session untouched.
    pub async fn poll(
        &self,
        session: &mut WatchSession,
    ) -> Result<PollSnapshot> {
        let count = self.store.current_count().await?;
        Ok(session.observe(count))
    }

    /// Polls every `poll_interval` until the expected number of new results
    /// shows up, the deadline passes or `cancel` fires.
    ///
    /// The last poll happens at the deadline itself, and a count query still
    /// running one poll interval after the deadline is abandoned, so the call
    /// returns within one poll interval of it.
    pub async fn await_completion(
        &self,
        session: &mut WatchSession,
        cancel: &CancellationToken,
    ) -> Result<WatchOutcome> {
        if session.is_done() {
            return Ok(session.completed());
        }

        let deadline_at = Instant::now() + session.deadline();
        // a slow or retrying query may not hold the call past this
        let give_up_at = deadline_at + session.poll_interval();
        loop {
            let count = select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(new_count = session.new_count(), "watch cancelled");
                    return Ok(session.cancelled());
                }
                res = count_with_retry(&*self.store, &self.retry) => res?,
                _ = sleep_until(give_up_at) => {
                    warn!(
                        "Count query still pending past the deadline. Only {}/{} results received",
                        session.new_count(),
                        session.expected_new_count()
                    );
                    return Ok(session.timed_out());
                }
            };

            let snapshot = session.observe(count);
            debug!(
                "Progress: {}/{} results received",
                snapshot.new_count,
                session.expected_new_count()
            );
            if snapshot.done {
                info!(new_count = snapshot.new_count, polls = session.polls(), "all results received");
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
                _ = cancel.cancelled() => {
                    info!(new_count = session.new_count(), "watch cancelled");
                    return Ok(session.cancelled());
                }
                _ = sleep(pause) => {}
            }
        }
    }
}

#[async_trait]
impl<S: ResultStore> CompletionObserver for CompletionWatcher<S> {
    async fn start_session(
        &self,
        expected_new_count: u64,
        deadline: Duration,
        poll_interval: Duration,
    ) -> Result<WatchSession> {
        CompletionWatcher::start_session(self, expected_new_count, deadline, poll_interval).await
    }

    async fn await_completion(
        &self,
        session: &mut WatchSession,
        cancel: &CancellationToken,
    ) -> Result<WatchOutcome> {
        CompletionWatcher::await_completion(self, session, cancel).await
    }
}
