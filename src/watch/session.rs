use std::time::Duration;

use config::ConfigError;
use tracing::debug;

use super::PollSnapshot;
use super::WatchOutcome;
use crate::Error;
use crate::Result;

/// Working state of one watch.
///
/// Only [`WatchSession::observe`] mutates the observed count, and it only ever
/// raises it.
#[derive(Debug, Clone)]
pub struct WatchSession {
    baseline: u64,
    expected_new_count: u64,
    deadline: Duration,
    poll_interval: Duration,
    high_water: u64,
    polls: u64,
}

impl WatchSession {
    pub fn new(
        baseline: u64,
        expected_new_count: u64,
        deadline: Duration,
        poll_interval: Duration,
    ) -> Result<Self> {
        validate_session_params(poll_interval)?;
        Ok(Self {
            baseline,
            expected_new_count,
            deadline,
            poll_interval,
            high_water: 0,
            polls: 0,
        })
    }

    pub fn baseline(&self) -> u64 {
        self.baseline
    }

    pub fn expected_new_count(&self) -> u64 {
        self.expected_new_count
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Highest new-result count seen so far.
    pub fn new_count(&self) -> u64 {
        self.high_water
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    pub fn is_done(&self) -> bool {
        self.high_water >= self.expected_new_count
    }

    /// Changes the target, e.g. when fewer inserts succeeded than planned.
    /// The baseline is kept.
    pub fn revise_expected(
        &mut self,
        expected_new_count: u64,
    ) {
        debug!(
            from = self.expected_new_count,
            to = expected_new_count,
            "revise expected new count"
        );
        self.expected_new_count = expected_new_count;
    }

    /// Folds one store count reading into the session.
    pub fn observe(
        &mut self,
        current_count: u64,
    ) -> PollSnapshot {
        self.polls += 1;
        let delta = current_count.saturating_sub(self.baseline);
        if delta > self.high_water {
            self.high_water = delta;
        } else if delta < self.high_water {
            debug!(
                current_count,
                high_water = self.high_water,
                "result count went down, keeping running maximum"
            );
        }

        PollSnapshot {
            new_count: self.high_water,
            done: self.is_done(),
        }
    }

    pub(crate) fn completed(&self) -> WatchOutcome {
        WatchOutcome::Completed {
            new_count: self.high_water,
        }
    }

    pub(crate) fn timed_out(&self) -> WatchOutcome {
        WatchOutcome::TimedOut {
            new_count: self.high_water,
            expected: self.expected_new_count,
        }
    }

    pub(crate) fn cancelled(&self) -> WatchOutcome {
        WatchOutcome::Cancelled {
            new_count: self.high_water,
            expected: self.expected_new_count,
        }
    }
}

pub(crate) fn validate_session_params(poll_interval: Duration) -> Result<()> {
    if poll_interval.is_zero() {
        return Err(Error::Config(ConfigError::Message(
            "poll_interval must be greater than 0".into(),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expected: u64) -> WatchSession {
        WatchSession::new(100, expected, Duration::from_secs(120), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn zero_poll_interval_should_be_rejected() {
        let result = WatchSession::new(0, 1, Duration::from_secs(1), Duration::ZERO);

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn zero_expected_should_be_done_before_any_poll() {
        let s = session(0);

        assert!(s.is_done());
        assert_eq!(s.new_count(), 0);
        assert_eq!(s.polls(), 0);
    }

    #[test]
    fn new_count_should_be_clamped_to_running_maximum() {
        let mut s = session(10);
        let readings = [103, 101, 98, 104, 102, 110];
        let seen: Vec<u64> = readings.iter().map(|c| s.observe(*c).new_count).collect();

        assert_eq!(seen, vec![3, 3, 3, 4, 4, 10]);
        assert!(s.is_done());
    }

    #[test]
    fn count_below_baseline_should_never_go_negative() {
        let mut s = session(2);

        let snapshot = s.observe(50);

        assert_eq!(snapshot.new_count, 0);
        assert!(!snapshot.done);
    }

    #[test]
    fn repeated_observation_should_be_idempotent() {
        let mut s = session(5);

        let first = s.observe(103);
        let second = s.observe(103);

        assert_eq!(first, second);
        assert_eq!(s.polls(), 2);
    }

    #[test]
    fn revise_expected_should_keep_baseline_and_progress() {
        let mut s = session(10);
        s.observe(107);

        s.revise_expected(7);

        assert_eq!(s.baseline(), 100);
        assert!(s.is_done());
        assert_eq!(s.completed(), WatchOutcome::Completed { new_count: 7 });
    }
}
