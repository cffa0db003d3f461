//! Completion watching for eventually consistent pipelines.
//!
//! A producer inserts records upstream; some managed stage later writes one
//! result per record into a result store. Nothing signals the producer when
//! that happens, so completion is observed by comparing the result store's
//! count against a baseline captured when the session started.
//!
//! ```text
//!  start_session ──► baseline = count()
//!        │
//!        ▼
//!  ┌──────────── await_completion ────────────┐
//!  │ count() (retried) ─► observe ─► done? ───┼──► Completed
//!  │        ▲                │ no            │
//!  │        └── sleep ◄── deadline? ── yes ───┼──► TimedOut
//!  │                                          │
//!  │  cancel token fired at any await ────────┼──► Cancelled
//!  └──────────────────────────────────────────┘
//! ```
//!
//! The new-result count of a session is the running maximum of
//! `count - baseline`, so deletions by other actors never make it go back.
//! Results written by unrelated producers into the same store are counted too;
//! a bare count cannot tell them apart.

mod channel_observer;
mod retry;
mod session;
mod watcher;

pub use channel_observer::*;
pub(crate) use retry::*;
pub use session::*;
pub use watcher::*;


use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::Result;

/// Terminal state of a watch session. None of these is an error: a timeout is
/// the expected report of slow or broken downstream processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// At least the expected number of new results appeared before the deadline.
    Completed { new_count: u64 },

    /// The deadline elapsed first.
    TimedOut { new_count: u64, expected: u64 },

    /// The caller's cancellation token fired first.
    Cancelled { new_count: u64, expected: u64 },
}

impl WatchOutcome {
    pub fn new_count(&self) -> u64 {
        match *self {
            WatchOutcome::Completed { new_count }
            | WatchOutcome::TimedOut { new_count, .. }
            | WatchOutcome::Cancelled { new_count, .. } => new_count,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, WatchOutcome::Completed { .. })
    }

    /// Results still outstanding, 0 once completed.
    pub fn missing(&self) -> u64 {
        match *self {
            WatchOutcome::Completed { .. } => 0,
            WatchOutcome::TimedOut { new_count, expected } | WatchOutcome::Cancelled { new_count, expected } => {
                expected.saturating_sub(new_count)
            }
        }
    }
}

/// One observation of the result store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSnapshot {
    pub new_count: u64,
    pub done: bool,
}

/// Strategy for learning that a batch of asynchronous results has landed.
///
/// [`CompletionWatcher`] polls a count; [`ChannelObserver`] is driven by a
/// pushed count feed. Callers depend on this trait so either can be used.
#[async_trait]
pub trait CompletionObserver: Send + Sync {
    /// Captures the baseline. Fails with [`crate::Error::Config`] when
    /// `poll_interval` is zero.
    async fn start_session(
        &self,
        expected_new_count: u64,
        deadline: Duration,
        poll_interval: Duration,
    ) -> Result<WatchSession>;

    /// Blocks until completion, deadline or cancellation.
    ///
    /// The deadline is wall-clock time measured from this call.
    async fn await_completion(
        &self,
        session: &mut WatchSession,
        cancel: &CancellationToken,
    ) -> Result<WatchOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_should_count_outstanding_results() {
        assert_eq!(WatchOutcome::Completed { new_count: 12 }.missing(), 0);
        assert_eq!(
            WatchOutcome::TimedOut {
                new_count: 7,
                expected: 10
            }
            .missing(),
            3
        );
        assert_eq!(
            WatchOutcome::Cancelled {
                new_count: 0,
                expected: 4
            }
            .missing(),
            4
        );
    }

    #[test]
    fn only_completed_is_completed() {
        assert!(WatchOutcome::Completed { new_count: 0 }.is_completed());
        assert!(!WatchOutcome::TimedOut {
            new_count: 1,
            expected: 2
        }
        .is_completed());
    }
}
