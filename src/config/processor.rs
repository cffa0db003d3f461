use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Settings of the local processing stage that stands in for the managed
/// trigger + inference chain.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcessorConfig {
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// How often pending inputs are drained (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum inputs handled per drain
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Written into every result record
    #[serde(default = "default_model_version")]
    pub model_version: String,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_ms: default_poll_interval_ms(),
            batch_size: default_batch_size(),
            model_version: default_model_version(),
        }
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.poll_interval_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "processor.poll_interval_ms must be greater than 0".into(),
            )));
        }

        if self.batch_size == 0 {
            return Err(Error::Config(ConfigError::Message(
                "processor.batch_size must be greater than 0".into(),
            )));
        }

        if self.model_version.trim().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "processor.model_version cannot be empty".into(),
            )));
        }

        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn default_enabled() -> bool {
    true
}
fn default_poll_interval_ms() -> u64 {
    250
}
fn default_batch_size() -> usize {
    16
}
fn default_model_version() -> String {
    "lexicon-v1".to_string()
}
