use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Timing of a completion watch session
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WatchConfig {
    /// Pause between two result store count queries (milliseconds)
    /// Default: 2000
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Wall-clock budget for all results to appear (milliseconds)
    /// Default: 120000
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl WatchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "watch.poll_interval_ms must be greater than 0".into(),
            )));
        }

        if self.deadline_ms < self.poll_interval_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "watch.deadline_ms {}ms should not be shorter than poll_interval_ms {}ms",
                self.deadline_ms, self.poll_interval_ms
            ))));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

fn default_poll_interval_ms() -> u64 {
    2000
}
fn default_deadline_ms() -> u64 {
    120_000
}
