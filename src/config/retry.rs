use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Fixed-backoff retry template for store queries
///
/// Unlike network RPC retries the delay does not grow: count queries are cheap
/// and the expected downstream latency is narrow and known.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts per query (must be at least 1)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Delay between two attempts (unit: milliseconds)
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Single attempt timeout (unit: milliseconds)
    #[serde(default = "default_op_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            timeout_ms: default_op_timeout_ms(),
        }
    }
}

impl RetryPolicy {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config(ConfigError::Message(
                "retry.max_attempts must be at least 1".into(),
            )));
        }

        if self.timeout_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "retry.timeout_ms must be greater than 0".into(),
            )));
        }

        Ok(())
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_max_attempts() -> usize {
    3
}
fn default_backoff_ms() -> u64 {
    500
}
fn default_op_timeout_ms() -> u64 {
    5000
}
