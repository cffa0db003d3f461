use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProducerConfig {
    /// Gap between two inserts (milliseconds, 0 disables pacing)
    /// Default: 2000
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,

    /// Number of sample records submitted per check
    /// Default: 10
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            pace_ms: default_pace_ms(),
            batch_size: default_batch_size(),
        }
    }
}

impl ProducerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "producer.batch_size must be greater than 0".into(),
            )));
        }
        Ok(())
    }

    pub fn pace(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }
}

fn default_pace_ms() -> u64 {
    2000
}
fn default_batch_size() -> usize {
    10
}
